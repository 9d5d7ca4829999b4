//! Table definitions for one fetch session's rows.

pub mod context_annotations;
pub mod referenced_tweets;
pub mod tweet_entity_annotations;
pub mod tweet_entity_hashtags;
pub mod tweet_entity_mentions;
pub mod tweet_entity_urls;
pub mod tweets;
pub mod user_description_hashtags;
pub mod user_description_mentions;
pub mod user_description_urls;
pub mod users;
