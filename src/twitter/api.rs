use super::auth::{encode_credentials, BearerToken, TokenResponse};
use super::request::SearchQuery;
use crate::config::Settings;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

const HEADER_RATE_REMAINING: &str = "x-rate-limit-remaining";
const HEADER_RATE_RESET: &str = "x-rate-limit-reset";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token endpoint rejected credentials (status {status})")]
    Auth { status: u16 },

    #[error("token endpoint response carried no access_token")]
    MissingToken,
}

/// Quota headers attached to every search response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: u64,
    /// Unix epoch seconds at which the quota resets.
    pub reset: i64,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| headers.get(name)?.to_str().ok()?.trim().parse::<i64>().ok();
        let remaining = read(HEADER_RATE_REMAINING)?;
        let reset = read(HEADER_RATE_RESET)?;
        Some(Self {
            remaining: remaining.max(0) as u64,
            reset,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SearchMeta {
    #[serde(default)]
    pub result_count: u64,
    pub next_token: Option<String>,
}

/// Body of a successful search response. `data` and `includes` are kept as raw JSON and
/// only decomposed once the whole session has been collected.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SearchPage {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub includes: Map<String, Value>,
    #[serde(default)]
    pub meta: SearchMeta,
}

/// What came back from one page request.
#[derive(Clone, Debug, PartialEq)]
pub struct PageResponse {
    pub status: u16,
    pub rate_limit: Option<RateLimit>,
    /// Present only for a success status.
    pub page: Option<SearchPage>,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The upstream search service. `TwitterApi` talks to the real thing.
#[async_trait::async_trait]
pub trait SearchApi: Send + Sync {
    async fn authenticate(&self) -> Result<BearerToken, FetchError>;
    async fn search(
        &self,
        token: &BearerToken,
        query: &SearchQuery,
    ) -> Result<PageResponse, FetchError>;
}

pub struct TwitterApi {
    client: Client,
    auth_url: String,
    search_url: String,
    api_key: String,
    api_secret: String,
}

impl TwitterApi {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        log::info!("Initializing Twitter API client.");

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            auth_url: settings.auth_url.to_owned(),
            search_url: settings.search_url.to_owned(),
            api_key: settings.api_key.to_owned(),
            api_secret: settings.api_secret.to_owned(),
        })
    }
}

#[async_trait::async_trait]
impl SearchApi for TwitterApi {
    async fn authenticate(&self) -> Result<BearerToken, FetchError> {
        let basic = encode_credentials(&self.api_key, &self.api_secret);
        let response = self
            .client
            .post(&self.auth_url)
            .header(AUTHORIZATION, format!("Basic {}", basic))
            .header(
                CONTENT_TYPE,
                "application/x-www-form-urlencoded;charset=UTF-8",
            )
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Auth {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response.json().await?;
        body.access_token
            .map(BearerToken::new)
            .ok_or(FetchError::MissingToken)
    }

    async fn search(
        &self,
        token: &BearerToken,
        query: &SearchQuery,
    ) -> Result<PageResponse, FetchError> {
        let response = self
            .client
            .get(&self.search_url)
            .bearer_auth(token.as_str())
            .query(&query.params())
            .send()
            .await?;

        let status = response.status();
        let rate_limit = RateLimit::from_headers(response.headers());
        let page = if status.is_success() {
            Some(response.json::<SearchPage>().await?)
        } else {
            None
        };

        Ok(PageResponse {
            status: status.as_u16(),
            rate_limit,
            page,
        })
    }
}
