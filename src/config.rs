use thiserror::Error;

pub const DEFAULT_AUTH_URL: &str = "https://api.twitter.com/oauth2/token";
pub const DEFAULT_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing {0} environment variable")]
    Missing(&'static str),
}

/// Runtime settings, read from the environment (and `.env` through dotenv in the binaries).
#[derive(Clone, Debug)]
pub struct Settings {
    pub api_key: String,
    pub api_secret: String,
    /// Persistence is disabled in the web server when this is unset.
    pub database_url: Option<String>,
    pub auth_url: String,
    pub search_url: String,
    /// Remote sentiment classifier. The built-in lexicon model is used when unset.
    pub sentiment_url: Option<String>,
    pub bind_addr: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            api_key: required("API_KEY")?,
            api_secret: required("API_SECRET")?,
            database_url: get("DATABASE_URL"),
            auth_url: get("TWITTER_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_owned()),
            search_url: get("TWITTER_SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_owned()),
            sentiment_url: get("SENTIMENT_URL"),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply() {
        let settings =
            Settings::from_lookup(lookup(&[("API_KEY", "key"), ("API_SECRET", "secret")]))
                .expect("settings");

        assert_eq!(settings.api_key, "key");
        assert_eq!(settings.api_secret, "secret");
        assert_eq!(settings.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(settings.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(settings.bind_addr, DEFAULT_BIND_ADDR);
        assert!(settings.database_url.is_none());
        assert!(settings.sentiment_url.is_none());
    }

    #[test]
    fn test_missing_credentials() {
        assert_eq!(
            Settings::from_lookup(lookup(&[("API_SECRET", "secret")])).unwrap_err(),
            ConfigError::Missing("API_KEY")
        );
        assert_eq!(
            Settings::from_lookup(lookup(&[("API_KEY", "key"), ("API_SECRET", " ")])).unwrap_err(),
            ConfigError::Missing("API_SECRET")
        );
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("API_KEY", "key"),
            ("API_SECRET", "secret"),
            ("DATABASE_URL", "postgres://localhost/tweets"),
            ("SENTIMENT_URL", "http://localhost:9000/predict"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ]))
        .expect("settings");

        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/tweets")
        );
        assert_eq!(
            settings.sentiment_url.as_deref(),
            Some("http://localhost:9000/predict")
        );
        assert_eq!(settings.bind_addr, "0.0.0.0:8080");
    }
}
