use super::api::{FetchError, SearchApi, SearchMeta};
use super::auth::BearerToken;
use super::request::SearchQuery;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;

/// How a collection loop ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectOutcome {
    /// Pagination ran out of results, out of cursors, or reached the requested limit.
    Complete,
    /// A page failed. Whatever was accumulated before it is still returned, so the data
    /// may be incomplete.
    Failed { status: Option<u16>, reason: String },
}

impl CollectOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, CollectOutcome::Complete)
    }
}

/// Raw pages accumulated over one session.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectedResponse {
    pub search_term: String,
    /// Every `data` entry of every successful page, in order.
    pub data: Vec<Value>,
    /// One `includes` object per successful page.
    pub includes: Vec<Value>,
    pub pages: usize,
    pub outcome: CollectOutcome,
}

impl CollectedResponse {
    pub fn empty(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            data: Vec::new(),
            includes: Vec::new(),
            pages: 0,
            outcome: CollectOutcome::Complete,
        }
    }
}

/// How long to wait for a quota reset: the time left until `reset` plus one second, never
/// negative.
pub fn rate_limit_wait(reset: i64, now: i64) -> Duration {
    Duration::from_secs(reset.saturating_sub(now).saturating_add(1).max(0) as u64)
}

/// One authenticated fetch session for a single search term.
pub struct Collector<'a> {
    api: &'a dyn SearchApi,
    token: BearerToken,
    search_term: String,
    since_id: Option<String>,
    limit: Option<usize>,
}

impl<'a> Collector<'a> {
    /// Authenticates once. Failure here is fatal and not retried.
    pub async fn connect(
        api: &'a dyn SearchApi,
        search_term: impl Into<String>,
    ) -> Result<Collector<'a>, FetchError> {
        let search_term = search_term.into();
        log::info!("Authenticating search session for {:?}.", search_term);
        let token = api.authenticate().await?;

        Ok(Self {
            api,
            token,
            search_term,
            since_id: None,
            limit: None,
        })
    }

    pub fn since_id(mut self, since_id: impl Into<String>) -> Self {
        self.since_id = Some(since_id.into());
        self
    }

    /// Stop paginating once at least `limit` tweets have been collected.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Pages through the search results until they run out or a page fails.
    pub async fn collect(self) -> CollectedResponse {
        let mut collected = CollectedResponse::empty(self.search_term.to_owned());
        let mut next_token: Option<String> = None;

        collected.outcome = loop {
            let query = SearchQuery {
                query: self.search_term.to_owned(),
                next_token: next_token.take(),
                since_id: self.since_id.to_owned(),
            };

            log::info!(
                "Fetching page {} for {:?}.",
                collected.pages + 1,
                self.search_term
            );
            let response = match self.api.search(&self.token, &query).await {
                Ok(response) => response,
                Err(e) => {
                    log::error!("Search request failed: {}", e);
                    break CollectOutcome::Failed {
                        status: None,
                        reason: e.to_string(),
                    };
                }
            };

            let page = match (response.is_success(), response.page) {
                (true, Some(page)) => page,
                _ => {
                    log::error!("Failed with status code {}.", response.status);
                    break CollectOutcome::Failed {
                        status: Some(response.status),
                        reason: format!("search returned status {}", response.status),
                    };
                }
            };

            collected.pages += 1;
            collected.data.extend(page.data);
            collected.includes.push(Value::Object(page.includes));

            match self.next_cursor(&page.meta, collected.data.len()) {
                Some(token) => next_token = Some(token),
                None => break CollectOutcome::Complete,
            }

            if let Some(limit) = response.rate_limit.filter(|l| l.is_exhausted()) {
                let wait = rate_limit_wait(limit.reset, Utc::now().timestamp());
                log::info!("Rate limited, sleeping for {} seconds.", wait.as_secs());
                actix_web::rt::time::sleep(wait).await;
            }
        };

        log::info!(
            "Collected {} tweets over {} pages for {:?}.",
            collected.data.len(),
            collected.pages,
            self.search_term
        );
        collected
    }

    /// The cursor for the next page, or None when this page was the last one.
    fn next_cursor(&self, meta: &SearchMeta, collected: usize) -> Option<String> {
        if meta.result_count == 0 {
            log::info!("Fetched all tweets.");
            return None;
        }
        if let Some(limit) = self.limit {
            if collected >= limit {
                log::info!("Reached limit of {} tweets.", limit);
                return None;
            }
        }
        if meta.next_token.is_none() {
            log::info!("No more tokens.");
        }
        meta.next_token.to_owned()
    }
}
