/// Page size requested from the search endpoint.
pub const MAX_RESULTS: u32 = 100;

const EXPANSIONS: &str = "author_id,entities.mentions.username,geo.place_id,in_reply_to_user_id,referenced_tweets.id,referenced_tweets.id.author_id";
const TWEET_FIELDS: &str = "author_id,context_annotations,conversation_id,created_at,entities,geo,id,in_reply_to_user_id,lang,public_metrics,possibly_sensitive,referenced_tweets,reply_settings,source,text,withheld";
const USER_FIELDS: &str = "created_at,description,entities,id,location,name,pinned_tweet_id,profile_image_url,protected,public_metrics,url,username,verified,withheld";
const PLACE_FIELDS: &str = "contained_within,country,country_code,full_name,geo,id,name,place_type";

/// One page request against the recent-search endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    /// Continuation cursor from the previous page's `meta.next_token`.
    pub next_token: Option<String>,
    /// Only return results newer than this tweet id.
    pub since_id: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            next_token: None,
            since_id: None,
        }
    }

    /// Query string pairs. Absent cursors are left out entirely.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", self.query.to_owned()),
            ("expansions", EXPANSIONS.to_owned()),
            ("tweet.fields", TWEET_FIELDS.to_owned()),
            ("user.fields", USER_FIELDS.to_owned()),
            ("place.fields", PLACE_FIELDS.to_owned()),
            ("max_results", MAX_RESULTS.to_string()),
        ];
        if let Some(token) = &self.next_token {
            params.push(("next_token", token.to_owned()));
        }
        if let Some(id) = &self.since_id {
            params.push(("since_id", id.to_owned()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_first_page_has_no_cursor() {
        let params = SearchQuery::new("rust lang").params();
        assert_eq!(value(&params, "query"), Some("rust lang"));
        assert_eq!(value(&params, "max_results"), Some("100"));
        assert_eq!(value(&params, "next_token"), None);
        assert_eq!(value(&params, "since_id"), None);
    }

    #[test]
    fn test_cursor_and_lower_bound() {
        let query = SearchQuery {
            query: "rust".to_owned(),
            next_token: Some("b26v89c19zqg8o3f".to_owned()),
            since_id: Some("1460323737035677698".to_owned()),
        };
        let params = query.params();
        assert_eq!(value(&params, "next_token"), Some("b26v89c19zqg8o3f"));
        assert_eq!(value(&params, "since_id"), Some("1460323737035677698"));
    }
}
