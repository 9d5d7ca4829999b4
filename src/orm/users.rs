use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub display_name: String,
    pub username: String,
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Text")]
    pub user_description: String,
    pub location: Option<String>,
    pub pinned_tweet_id: Option<String>,
    pub profile_image_url: Option<String>,
    pub protected: Option<bool>,
    pub followers: i64,
    pub following: i64,
    pub number_of_tweets: i64,
    pub listed_count: i64,
    pub profile_url: String,
    pub verified: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tweets::Entity")]
    Tweets,
    #[sea_orm(has_many = "super::user_description_urls::Entity")]
    UserDescriptionUrls,
    #[sea_orm(has_many = "super::user_description_hashtags::Entity")]
    UserDescriptionHashtags,
    #[sea_orm(has_many = "super::user_description_mentions::Entity")]
    UserDescriptionMentions,
}

impl Related<super::tweets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tweets.def()
    }
}

impl Related<super::user_description_urls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserDescriptionUrls.def()
    }
}

impl Related<super::user_description_hashtags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserDescriptionHashtags.def()
    }
}

impl Related<super::user_description_mentions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserDescriptionMentions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
