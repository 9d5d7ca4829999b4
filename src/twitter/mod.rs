//! Client for the recent-search endpoint of the Twitter v2 API.

pub mod api;
pub mod auth;
pub mod collect;
pub mod request;

pub use api::{FetchError, PageResponse, RateLimit, SearchApi, SearchMeta, SearchPage, TwitterApi};
pub use auth::{encode_credentials, BearerToken};
pub use collect::{rate_limit_wait, CollectOutcome, CollectedResponse, Collector};
pub use request::SearchQuery;
