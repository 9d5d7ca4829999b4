use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tweets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tweet_id: String,
    pub author_id: String,
    pub created_at: DateTimeWithTimeZone,
    pub reply_settings: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub tweet_text: String,
    pub conversation_id: String,
    pub possibly_sensitive: Option<bool>,
    pub retweet_count: i64,
    pub reply_count: i64,
    pub like_count: i64,
    pub quote_count: i64,
    pub lang: Option<String>,
    pub source: Option<String>,
    pub search_term: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::UserId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(has_many = "super::referenced_tweets::Entity")]
    ReferencedTweets,
    #[sea_orm(has_many = "super::context_annotations::Entity")]
    ContextAnnotations,
    #[sea_orm(has_many = "super::tweet_entity_urls::Entity")]
    TweetEntityUrls,
    #[sea_orm(has_many = "super::tweet_entity_mentions::Entity")]
    TweetEntityMentions,
    #[sea_orm(has_many = "super::tweet_entity_hashtags::Entity")]
    TweetEntityHashtags,
    #[sea_orm(has_many = "super::tweet_entity_annotations::Entity")]
    TweetEntityAnnotations,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::referenced_tweets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReferencedTweets.def()
    }
}

impl Related<super::context_annotations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContextAnnotations.def()
    }
}

impl Related<super::tweet_entity_urls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TweetEntityUrls.def()
    }
}

impl Related<super::tweet_entity_mentions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TweetEntityMentions.def()
    }
}

impl Related<super::tweet_entity_hashtags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TweetEntityHashtags.def()
    }
}

impl Related<super::tweet_entity_annotations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TweetEntityAnnotations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
