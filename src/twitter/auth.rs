use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use url::form_urlencoded::byte_serialize;

/// OAuth2 app-only bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body of the token endpoint's response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
}

/// Builds the `Basic` credential for the client-credentials exchange.
///
/// Key and secret are form-encoded (space becomes `+`) before being joined by a colon and
/// base64-encoded.
pub fn encode_credentials(api_key: &str, api_secret: &str) -> String {
    let key: String = byte_serialize(api_key.as_bytes()).collect();
    let secret: String = byte_serialize(api_secret.as_bytes()).collect();
    STANDARD.encode(format!("{}:{}", key, secret))
}
