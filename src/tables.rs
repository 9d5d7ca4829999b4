//! Flat rows produced by decomposing a fetch session.
//!
//! Every row type mirrors one table in `crate::orm`. Rows link to their owner by the
//! upstream id string, never by a surrogate key.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TweetRow {
    pub tweet_id: String,
    pub author_id: String,
    pub created_at: DateTime<FixedOffset>,
    pub reply_settings: Option<String>,
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

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferencedTweetRow {
    pub originating_tweet_id: String,
    pub referenced_tweet_id: String,
    /// One of `replied_to`, `retweeted` or `quoted`.
    pub referencing_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContextAnnotationRow {
    pub originating_tweet_id: String,
    pub annotation_id: String,
    pub annotation_name: String,
    pub annotation_description: Option<String>,
    pub annotation_entity_id: String,
    pub annotation_entity_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityUrlRow {
    pub originating_tweet_id: String,
    pub url: String,
    pub url_status: Option<i32>,
    pub url_title: Option<String>,
    pub url_description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityMentionRow {
    pub originating_tweet_id: String,
    pub mentioned_username: String,
    pub mentioned_user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityHashtagRow {
    pub originating_tweet_id: String,
    pub hashtag: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityAnnotationRow {
    pub originating_tweet_id: String,
    pub annotation_type: Option<String>,
    pub annotation_probability: Option<f64>,
    pub annotation_normalised_text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserRow {
    pub user_id: String,
    pub display_name: String,
    pub username: String,
    pub created_at: DateTime<FixedOffset>,
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

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserDescriptionUrlRow {
    pub user_id: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserDescriptionHashtagRow {
    pub user_id: String,
    pub hashtag: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserDescriptionMentionRow {
    pub user_id: String,
    pub mention: String,
}

/// All rows of one fetch session, handed to persistence as a single unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tables {
    pub users: Vec<UserRow>,
    pub tweets: Vec<TweetRow>,
    pub referenced_tweets: Vec<ReferencedTweetRow>,
    pub context_annotations: Vec<ContextAnnotationRow>,
    pub entity_urls: Vec<EntityUrlRow>,
    pub entity_mentions: Vec<EntityMentionRow>,
    pub entity_hashtags: Vec<EntityHashtagRow>,
    pub entity_annotations: Vec<EntityAnnotationRow>,
    pub user_description_urls: Vec<UserDescriptionUrlRow>,
    pub user_description_hashtags: Vec<UserDescriptionHashtagRow>,
    pub user_description_mentions: Vec<UserDescriptionMentionRow>,
}

impl Tables {
    /// Row count per table, in insertion order.
    pub fn counts(&self) -> [(&'static str, usize); 11] {
        [
            ("users", self.users.len()),
            ("tweets", self.tweets.len()),
            ("referenced_tweets", self.referenced_tweets.len()),
            ("context_annotations", self.context_annotations.len()),
            ("tweet_entity_urls", self.entity_urls.len()),
            ("tweet_entity_mentions", self.entity_mentions.len()),
            ("tweet_entity_hashtags", self.entity_hashtags.len()),
            ("tweet_entity_annotations", self.entity_annotations.len()),
            ("user_description_urls", self.user_description_urls.len()),
            ("user_description_hashtags", self.user_description_hashtags.len()),
            ("user_description_mentions", self.user_description_mentions.len()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.counts().iter().all(|(_, count)| *count == 0)
    }
}
