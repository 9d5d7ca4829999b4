//! Writes a decomposed session to the database.

use crate::orm::*;
use crate::tables::*;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, IntoActiveModel, Schema, TransactionTrait,
};

/// Rows per INSERT. The widest table binds 15 columns, and Postgres caps a statement at
/// 65535 bind parameters.
pub const INSERT_CHUNK: usize = 1000;

/// Creates every table that does not exist yet, parents before children.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = [
        schema.create_table_from_entity(users::Entity),
        schema.create_table_from_entity(tweets::Entity),
        schema.create_table_from_entity(referenced_tweets::Entity),
        schema.create_table_from_entity(context_annotations::Entity),
        schema.create_table_from_entity(tweet_entity_urls::Entity),
        schema.create_table_from_entity(tweet_entity_mentions::Entity),
        schema.create_table_from_entity(tweet_entity_hashtags::Entity),
        schema.create_table_from_entity(tweet_entity_annotations::Entity),
        schema.create_table_from_entity(user_description_urls::Entity),
        schema.create_table_from_entity(user_description_hashtags::Entity),
        schema.create_table_from_entity(user_description_mentions::Entity),
    ];
    for statement in statements.iter_mut() {
        db.execute(backend.build(statement.if_not_exists())).await?;
    }

    Ok(())
}

/// Inserts every row of a session inside one transaction. Either all of it lands or none.
pub async fn commit_tables(db: &DatabaseConnection, tables: &Tables) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    insert_rows(&txn, tables.users.iter().map(user_model)).await?;
    insert_rows(&txn, tables.tweets.iter().map(tweet_model)).await?;
    insert_rows(
        &txn,
        tables
            .referenced_tweets
            .iter()
            .map(|row| referenced_tweets::ActiveModel {
                originating_tweet_id: Set(row.originating_tweet_id.to_owned()),
                referenced_tweet_id: Set(row.referenced_tweet_id.to_owned()),
                referencing_type: Set(row.referencing_type.to_owned()),
                ..Default::default()
            }),
    )
    .await?;
    insert_rows(
        &txn,
        tables
            .context_annotations
            .iter()
            .map(|row| context_annotations::ActiveModel {
                originating_tweet_id: Set(row.originating_tweet_id.to_owned()),
                annotation_id: Set(row.annotation_id.to_owned()),
                annotation_name: Set(row.annotation_name.to_owned()),
                annotation_description: Set(row.annotation_description.to_owned()),
                annotation_entity_id: Set(row.annotation_entity_id.to_owned()),
                annotation_entity_name: Set(row.annotation_entity_name.to_owned()),
                ..Default::default()
            }),
    )
    .await?;
    insert_rows(
        &txn,
        tables
            .entity_urls
            .iter()
            .map(|row| tweet_entity_urls::ActiveModel {
                originating_tweet_id: Set(row.originating_tweet_id.to_owned()),
                url: Set(row.url.to_owned()),
                url_status: Set(row.url_status),
                url_title: Set(row.url_title.to_owned()),
                url_description: Set(row.url_description.to_owned()),
                ..Default::default()
            }),
    )
    .await?;
    insert_rows(
        &txn,
        tables
            .entity_mentions
            .iter()
            .map(|row| tweet_entity_mentions::ActiveModel {
                originating_tweet_id: Set(row.originating_tweet_id.to_owned()),
                mentioned_username: Set(row.mentioned_username.to_owned()),
                mentioned_user_id: Set(row.mentioned_user_id.to_owned()),
                ..Default::default()
            }),
    )
    .await?;
    insert_rows(
        &txn,
        tables
            .entity_hashtags
            .iter()
            .map(|row| tweet_entity_hashtags::ActiveModel {
                originating_tweet_id: Set(row.originating_tweet_id.to_owned()),
                hashtag: Set(row.hashtag.to_owned()),
                ..Default::default()
            }),
    )
    .await?;
    insert_rows(
        &txn,
        tables
            .entity_annotations
            .iter()
            .map(|row| tweet_entity_annotations::ActiveModel {
                originating_tweet_id: Set(row.originating_tweet_id.to_owned()),
                annotation_type: Set(row.annotation_type.to_owned()),
                annotation_probability: Set(row.annotation_probability),
                annotation_normalised_text: Set(row.annotation_normalised_text.to_owned()),
                ..Default::default()
            }),
    )
    .await?;
    insert_rows(
        &txn,
        tables
            .user_description_urls
            .iter()
            .map(|row| user_description_urls::ActiveModel {
                user_id: Set(row.user_id.to_owned()),
                url: Set(row.url.to_owned()),
                ..Default::default()
            }),
    )
    .await?;
    insert_rows(
        &txn,
        tables
            .user_description_hashtags
            .iter()
            .map(|row| user_description_hashtags::ActiveModel {
                user_id: Set(row.user_id.to_owned()),
                hashtag: Set(row.hashtag.to_owned()),
                ..Default::default()
            }),
    )
    .await?;
    insert_rows(
        &txn,
        tables
            .user_description_mentions
            .iter()
            .map(|row| user_description_mentions::ActiveModel {
                user_id: Set(row.user_id.to_owned()),
                mention: Set(row.mention.to_owned()),
                ..Default::default()
            }),
    )
    .await?;

    txn.commit().await?;

    log::info!(
        "Committed {} users and {} tweets.",
        tables.users.len(),
        tables.tweets.len()
    );
    Ok(())
}

/// Bulk inserts of at most `INSERT_CHUNK` rows each. Empty collections issue no statement.
async fn insert_rows<A, I>(txn: &DatabaseTransaction, rows: I) -> Result<(), DbErr>
where
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    I: IntoIterator<Item = A>,
{
    let mut rows = rows.into_iter();
    let mut inserted = 0;
    loop {
        let chunk: Vec<A> = rows.by_ref().take(INSERT_CHUNK).collect();
        if chunk.is_empty() {
            break;
        }
        inserted += A::Entity::insert_many(chunk)
            .exec_without_returning(txn)
            .await?;
    }
    if inserted > 0 {
        log::debug!("insert_rows: {} rows inserted", inserted);
    }
    Ok(())
}

fn user_model(row: &UserRow) -> users::ActiveModel {
    users::ActiveModel {
        user_id: Set(row.user_id.to_owned()),
        display_name: Set(row.display_name.to_owned()),
        username: Set(row.username.to_owned()),
        created_at: Set(row.created_at),
        user_description: Set(row.user_description.to_owned()),
        location: Set(row.location.to_owned()),
        pinned_tweet_id: Set(row.pinned_tweet_id.to_owned()),
        profile_image_url: Set(row.profile_image_url.to_owned()),
        protected: Set(row.protected),
        followers: Set(row.followers),
        following: Set(row.following),
        number_of_tweets: Set(row.number_of_tweets),
        listed_count: Set(row.listed_count),
        profile_url: Set(row.profile_url.to_owned()),
        verified: Set(row.verified),
    }
}

fn tweet_model(row: &TweetRow) -> tweets::ActiveModel {
    tweets::ActiveModel {
        tweet_id: Set(row.tweet_id.to_owned()),
        author_id: Set(row.author_id.to_owned()),
        created_at: Set(row.created_at),
        reply_settings: Set(row.reply_settings.to_owned()),
        tweet_text: Set(row.tweet_text.to_owned()),
        conversation_id: Set(row.conversation_id.to_owned()),
        possibly_sensitive: Set(row.possibly_sensitive),
        retweet_count: Set(row.retweet_count),
        reply_count: Set(row.reply_count),
        like_count: Set(row.like_count),
        quote_count: Set(row.quote_count),
        lang: Set(row.lang.to_owned()),
        source: Set(row.source.to_owned()),
        search_term: Set(row.search_term.to_owned()),
    }
}
