use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "referenced_tweets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub originating_tweet_id: String,
    pub referenced_tweet_id: String,
    pub referencing_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tweets::Entity",
        from = "Column::OriginatingTweetId",
        to = "super::tweets::Column::TweetId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Tweets,
}

impl Related<super::tweets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tweets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
