//! Flattens the raw pages of a fetch session into relational rows.
//!
//! Each post and each includes block is first deserialized into a fixed record. A missing
//! mandatory field therefore surfaces as a lookup error for the whole batch. Optional fields
//! come back as `None`.

use crate::tables::*;
use crate::twitter::CollectedResponse;
use chrono::{DateTime, FixedOffset, Local};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("lookup failed in {record}: {source}")]
    Lookup {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Deserialize)]
struct RawTweet {
    id: String,
    author_id: String,
    created_at: String,
    reply_settings: Option<String>,
    text: String,
    conversation_id: String,
    possibly_sensitive: Option<bool>,
    public_metrics: TweetMetrics,
    lang: Option<String>,
    source: Option<String>,
    #[serde(default)]
    referenced_tweets: Vec<RawReference>,
    #[serde(default)]
    context_annotations: Vec<RawContextAnnotation>,
    #[serde(default)]
    entities: RawTweetEntities,
}

#[derive(Deserialize)]
struct TweetMetrics {
    retweet_count: i64,
    reply_count: i64,
    like_count: i64,
    quote_count: i64,
}

#[derive(Deserialize)]
struct RawReference {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

#[derive(Deserialize)]
struct RawContextAnnotation {
    domain: RawDomain,
    entity: RawAnnotationEntity,
}

#[derive(Deserialize)]
struct RawDomain {
    id: String,
    name: String,
    description: Option<String>,
}

#[derive(Deserialize)]
struct RawAnnotationEntity {
    id: String,
    name: String,
}

#[derive(Default, Deserialize)]
struct RawTweetEntities {
    #[serde(default)]
    urls: Vec<RawUrl>,
    #[serde(default)]
    mentions: Vec<RawMention>,
    #[serde(default)]
    hashtags: Vec<RawTag>,
    #[serde(default)]
    annotations: Vec<RawAnnotation>,
}

#[derive(Deserialize)]
struct RawUrl {
    expanded_url: String,
    status: Option<i32>,
    title: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct RawMention {
    username: String,
    id: Option<String>,
}

#[derive(Deserialize)]
struct RawTag {
    tag: String,
}

#[derive(Deserialize)]
struct RawAnnotation {
    #[serde(rename = "type")]
    kind: Option<String>,
    probability: Option<f64>,
    normalized_text: Option<String>,
}

#[derive(Deserialize)]
struct RawIncludes {
    #[serde(default)]
    users: Vec<RawUser>,
}

#[derive(Deserialize)]
struct RawUser {
    id: String,
    name: String,
    username: String,
    created_at: String,
    description: String,
    location: Option<String>,
    pinned_tweet_id: Option<String>,
    profile_image_url: Option<String>,
    protected: Option<bool>,
    verified: Option<bool>,
    public_metrics: UserMetrics,
    url: String,
    #[serde(default)]
    entities: RawUserEntities,
}

#[derive(Deserialize)]
struct UserMetrics {
    followers_count: i64,
    following_count: i64,
    tweet_count: i64,
    listed_count: i64,
}

#[derive(Default, Deserialize)]
struct RawUserEntities {
    url: Option<RawUrlEntity>,
    #[serde(default)]
    description: RawDescriptionEntities,
}

#[derive(Deserialize)]
struct RawUrlEntity {
    #[serde(default)]
    urls: Vec<RawLink>,
}

#[derive(Deserialize)]
struct RawLink {
    expanded_url: Option<String>,
    url: String,
}

#[derive(Default, Deserialize)]
struct RawDescriptionEntities {
    #[serde(default)]
    hashtags: Vec<RawTag>,
    #[serde(default)]
    mentions: Vec<RawMention>,
}

/// Parses an ISO-8601 timestamp with offset and moves it into the local zone.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, DecomposeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Local).fixed_offset())
        .map_err(|source| DecomposeError::Timestamp {
            value: value.to_owned(),
            source,
        })
}

fn lookup<'de, T: Deserialize<'de>>(value: &'de Value, record: String) -> Result<T, DecomposeError> {
    T::deserialize(value).map_err(|source| DecomposeError::Lookup { record, source })
}

/// One decomposition pass. Owns the set of user ids already emitted in this session.
pub struct Decomposer {
    search_term: String,
    seen_users: HashSet<String>,
    tables: Tables,
}

impl Decomposer {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            seen_users: HashSet::new(),
            tables: Tables::default(),
        }
    }

    pub fn push_tweet(&mut self, index: usize, value: &Value) -> Result<(), DecomposeError> {
        let raw: RawTweet = lookup(value, format!("data[{}]", index))?;
        let tweet_id = raw.id;

        self.tables.tweets.push(TweetRow {
            tweet_id: tweet_id.to_owned(),
            author_id: raw.author_id,
            created_at: parse_timestamp(&raw.created_at)?,
            reply_settings: raw.reply_settings,
            tweet_text: raw.text,
            conversation_id: raw.conversation_id,
            possibly_sensitive: raw.possibly_sensitive,
            retweet_count: raw.public_metrics.retweet_count,
            reply_count: raw.public_metrics.reply_count,
            like_count: raw.public_metrics.like_count,
            quote_count: raw.public_metrics.quote_count,
            lang: raw.lang,
            source: raw.source,
            search_term: self.search_term.to_owned(),
        });

        for reference in raw.referenced_tweets {
            self.tables.referenced_tweets.push(ReferencedTweetRow {
                originating_tweet_id: tweet_id.to_owned(),
                referenced_tweet_id: reference.id,
                referencing_type: reference.kind,
            });
        }

        for annotation in raw.context_annotations {
            self.tables.context_annotations.push(ContextAnnotationRow {
                originating_tweet_id: tweet_id.to_owned(),
                annotation_id: annotation.domain.id,
                annotation_name: annotation.domain.name,
                annotation_description: annotation.domain.description,
                annotation_entity_id: annotation.entity.id,
                annotation_entity_name: annotation.entity.name,
            });
        }

        let entities = raw.entities;
        for url in entities.urls {
            self.tables.entity_urls.push(EntityUrlRow {
                originating_tweet_id: tweet_id.to_owned(),
                url: url.expanded_url,
                url_status: url.status,
                url_title: url.title,
                url_description: url.description,
            });
        }
        for mention in entities.mentions {
            self.tables.entity_mentions.push(EntityMentionRow {
                originating_tweet_id: tweet_id.to_owned(),
                mentioned_username: mention.username,
                mentioned_user_id: mention.id,
            });
        }
        for hashtag in entities.hashtags {
            self.tables.entity_hashtags.push(EntityHashtagRow {
                originating_tweet_id: tweet_id.to_owned(),
                hashtag: hashtag.tag,
            });
        }
        for annotation in entities.annotations {
            self.tables.entity_annotations.push(EntityAnnotationRow {
                originating_tweet_id: tweet_id.to_owned(),
                annotation_type: annotation.kind,
                annotation_probability: annotation.probability,
                annotation_normalised_text: annotation.normalized_text,
            });
        }

        Ok(())
    }

    /// Adds the users of one page's includes block.
    ///
    /// The first payload seen for a user id becomes its row; later ones are dropped even
    /// when their fields differ. Bio entities are added for every payload, duplicates
    /// included.
    pub fn push_includes(&mut self, index: usize, value: &Value) -> Result<(), DecomposeError> {
        let includes: RawIncludes = lookup(value, format!("includes[{}]", index))?;

        for user in includes.users {
            let created_at = parse_timestamp(&user.created_at)?;
            if self.seen_users.insert(user.id.to_owned()) {
                self.tables.users.push(UserRow {
                    user_id: user.id.to_owned(),
                    display_name: user.name,
                    username: user.username,
                    created_at,
                    user_description: user.description,
                    location: user.location,
                    pinned_tweet_id: user.pinned_tweet_id,
                    profile_image_url: user.profile_image_url,
                    protected: user.protected,
                    followers: user.public_metrics.followers_count,
                    following: user.public_metrics.following_count,
                    number_of_tweets: user.public_metrics.tweet_count,
                    listed_count: user.public_metrics.listed_count,
                    profile_url: user.url,
                    verified: user.verified,
                });
            }

            let entities = user.entities;
            for link in entities.url.map(|u| u.urls).unwrap_or_default() {
                self.tables.user_description_urls.push(UserDescriptionUrlRow {
                    user_id: user.id.to_owned(),
                    url: link.expanded_url.unwrap_or(link.url),
                });
            }
            for hashtag in entities.description.hashtags {
                self.tables
                    .user_description_hashtags
                    .push(UserDescriptionHashtagRow {
                        user_id: user.id.to_owned(),
                        hashtag: hashtag.tag,
                    });
            }
            for mention in entities.description.mentions {
                self.tables
                    .user_description_mentions
                    .push(UserDescriptionMentionRow {
                        user_id: user.id.to_owned(),
                        mention: mention.username,
                    });
            }
        }

        Ok(())
    }

    pub fn finish(self) -> Tables {
        for (table, count) in self.tables.counts() {
            log::debug!("decompose: {} {} rows", table, count);
        }
        self.tables
    }
}

/// Decomposes a whole session: every post in document order, then every includes block in
/// page order.
pub fn decompose(response: &CollectedResponse) -> Result<Tables, DecomposeError> {
    let mut decomposer = Decomposer::new(response.search_term.to_owned());
    for (index, tweet) in response.data.iter().enumerate() {
        decomposer.push_tweet(index, tweet)?;
    }
    for (index, includes) in response.includes.iter().enumerate() {
        decomposer.push_includes(index, includes)?;
    }
    Ok(decomposer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tweet(id: &str, author: &str) -> Value {
        json!({
            "id": id,
            "author_id": author,
            "created_at": "2024-01-01T10:00:00.000Z",
            "reply_settings": "everyone",
            "text": format!("tweet {}", id),
            "conversation_id": id,
            "possibly_sensitive": false,
            "public_metrics": {
                "retweet_count": 1,
                "reply_count": 2,
                "like_count": 3,
                "quote_count": 4
            },
            "lang": "en",
            "source": "Twitter Web App"
        })
    }

    fn user(id: &str, followers: i64) -> Value {
        json!({
            "id": id,
            "name": format!("User {}", id),
            "username": format!("user{}", id),
            "created_at": "2015-06-01T08:30:00.000Z",
            "description": "bio",
            "profile_image_url": "https://pbs.twimg.com/profile_images/1/a.jpg",
            "protected": false,
            "verified": false,
            "url": "",
            "public_metrics": {
                "followers_count": followers,
                "following_count": 10,
                "tweet_count": 100,
                "listed_count": 1
            },
            "entities": {
                "url": { "urls": [{ "url": "https://t.co/x", "expanded_url": "https://example.com" }] },
                "description": {
                    "hashtags": [{ "tag": "rust" }],
                    "mentions": [{ "username": "ferris" }]
                }
            }
        })
    }

    fn session(data: Vec<Value>, includes: Vec<Value>) -> CollectedResponse {
        let mut response = CollectedResponse::empty("rust");
        response.data = data;
        response.includes = includes;
        response
    }

    #[test]
    fn test_empty_session() {
        let tables = decompose(&session(vec![], vec![json!({})])).unwrap();
        assert!(tables.is_empty());
        assert_eq!(tables, Tables::default());

        let tables = decompose(&session(vec![], vec![])).unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn test_tweet_fields() {
        let tables = decompose(&session(vec![tweet("1", "10")], vec![])).unwrap();
        assert_eq!(tables.tweets.len(), 1);

        let row = &tables.tweets[0];
        assert_eq!(row.tweet_id, "1");
        assert_eq!(row.author_id, "10");
        assert_eq!(row.tweet_text, "tweet 1");
        assert_eq!(row.search_term, "rust");
        assert_eq!(row.possibly_sensitive, Some(false));
        assert_eq!(row.source.as_deref(), Some("Twitter Web App"));
        assert_eq!(
            (row.retweet_count, row.reply_count, row.like_count, row.quote_count),
            (1, 2, 3, 4)
        );
        assert_eq!(
            row.created_at,
            DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_optional_tweet_fields_absent() {
        let mut value = tweet("1", "10");
        let object = value.as_object_mut().unwrap();
        object.remove("source");
        object.remove("possibly_sensitive");

        let tables = decompose(&session(vec![value], vec![])).unwrap();
        assert_eq!(tables.tweets[0].source, None);
        assert_eq!(tables.tweets[0].possibly_sensitive, None);
    }

    #[test]
    fn test_missing_mandatory_field_fails_batch() {
        let mut broken = tweet("2", "10");
        broken.as_object_mut().unwrap().remove("author_id");

        let err = decompose(&session(vec![tweet("1", "10"), broken], vec![])).unwrap_err();
        match err {
            DecomposeError::Lookup { record, .. } => assert_eq!(record, "data[1]"),
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        let mut value = tweet("1", "10");
        value["created_at"] = json!("01-01-2024 10:00");

        assert!(matches!(
            decompose(&session(vec![value], vec![])),
            Err(DecomposeError::Timestamp { .. })
        ));
    }

    #[test]
    fn test_references_and_entities() {
        let mut value = tweet("1", "10");
        value["referenced_tweets"] = json!([
            { "type": "quoted", "id": "900" },
            { "type": "replied_to", "id": "901" }
        ]);
        value["entities"] = json!({
            "urls": [
                { "expanded_url": "https://example.com/a", "status": 200, "title": "A" },
                { "expanded_url": "https://example.com/b" }
            ],
            "mentions": [{ "username": "ferris", "id": "42" }],
            "hashtags": [{ "tag": "rustlang" }, { "tag": "async" }],
            "annotations": [{ "type": "Organization", "probability": 0.8, "normalized_text": "Mozilla" }]
        });

        let tables = decompose(&session(vec![value], vec![])).unwrap();

        assert_eq!(tables.referenced_tweets.len(), 2);
        assert_eq!(tables.referenced_tweets[0].referencing_type, "quoted");
        assert_eq!(tables.referenced_tweets[1].referenced_tweet_id, "901");

        assert_eq!(tables.entity_urls.len(), 2);
        assert_eq!(tables.entity_urls[0].url_status, Some(200));
        assert_eq!(tables.entity_urls[0].url_title.as_deref(), Some("A"));
        assert_eq!(tables.entity_urls[1].url_status, None);
        assert_eq!(tables.entity_urls[1].url_description, None);

        assert_eq!(tables.entity_mentions[0].mentioned_username, "ferris");
        assert_eq!(tables.entity_mentions[0].mentioned_user_id.as_deref(), Some("42"));
        assert_eq!(tables.entity_hashtags.len(), 2);
        assert_eq!(tables.entity_annotations[0].annotation_probability, Some(0.8));
        assert_eq!(
            tables.entity_annotations[0].annotation_normalised_text.as_deref(),
            Some("Mozilla")
        );
        assert!(tables
            .entity_urls
            .iter()
            .all(|row| row.originating_tweet_id == "1"));
    }

    #[test]
    fn test_context_annotation_description_is_optional() {
        let mut value = tweet("1", "10");
        value["context_annotations"] = json!([{
            "domain": { "id": "46", "name": "Business Taxonomy" },
            "entity": { "id": "1557", "name": "Technology" }
        }]);

        let tables = decompose(&session(vec![value], vec![])).unwrap();
        assert_eq!(tables.context_annotations.len(), 1);
        let row = &tables.context_annotations[0];
        assert_eq!(row.annotation_id, "46");
        assert_eq!(row.annotation_description, None);
        assert_eq!(row.annotation_entity_name, "Technology");
    }

    #[test]
    fn test_context_annotation_missing_domain_id_is_fatal() {
        let mut good = tweet("1", "10");
        good["context_annotations"] = json!([{
            "domain": { "id": "46", "name": "Business Taxonomy", "description": "Categories" },
            "entity": { "id": "1557", "name": "Technology" }
        }]);
        let mut bad = tweet("2", "10");
        bad["context_annotations"] = json!([{
            "domain": { "name": "Business Taxonomy" },
            "entity": { "id": "1557", "name": "Technology" }
        }]);

        assert!(matches!(
            decompose(&session(vec![good, bad], vec![])),
            Err(DecomposeError::Lookup { .. })
        ));
    }

    #[test]
    fn test_users_deduplicated_first_wins() {
        let includes = vec![
            json!({ "users": [user("10", 5), user("11", 7)] }),
            json!({ "users": [user("10", 9999)] }),
        ];

        let tables = decompose(&session(vec![], includes)).unwrap();

        assert_eq!(tables.users.len(), 2);
        let first = tables.users.iter().find(|u| u.user_id == "10").unwrap();
        assert_eq!(first.followers, 5);
        assert_eq!(first.display_name, "User 10");
        assert_eq!(tables.users[0].user_id, "10");
        assert_eq!(tables.users[1].user_id, "11");
    }

    #[test]
    fn test_user_bio_entities_repeat_per_occurrence() {
        let includes = vec![
            json!({ "users": [user("10", 5)] }),
            json!({ "users": [user("10", 5)] }),
        ];

        let tables = decompose(&session(vec![], includes)).unwrap();

        assert_eq!(tables.users.len(), 1);
        assert_eq!(tables.user_description_urls.len(), 2);
        assert_eq!(tables.user_description_urls[0].url, "https://example.com");
        assert_eq!(tables.user_description_hashtags.len(), 2);
        assert_eq!(tables.user_description_mentions.len(), 2);
        assert_eq!(tables.user_description_mentions[0].mention, "ferris");
    }

    #[test]
    fn test_user_url_falls_back_to_short_link() {
        let mut value = user("10", 5);
        value["entities"]["url"] = json!({ "urls": [{ "url": "https://t.co/x" }] });
        value.as_object_mut().unwrap().remove("location");

        let tables = decompose(&session(vec![], vec![json!({ "users": [value] })])).unwrap();
        assert_eq!(tables.user_description_urls[0].url, "https://t.co/x");
        assert_eq!(tables.users[0].location, None);
        assert_eq!(tables.users[0].pinned_tweet_id, None);
    }
}
