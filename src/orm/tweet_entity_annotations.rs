use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tweet_entity_annotations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub originating_tweet_id: String,
    pub annotation_type: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub annotation_probability: Option<f64>,
    pub annotation_normalised_text: Option<String>,
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
