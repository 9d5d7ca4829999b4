//! The sentiment classifier behind the analysis endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unknown sentiment label {0:?}")]
    UnknownLabel(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Signed scalar used by the scores: -1, 0 or +1.
    pub fn signed(self) -> f64 {
        match self {
            Sentiment::Negative => -1.0,
            Sentiment::Neutral => 0.0,
            Sentiment::Positive => 1.0,
        }
    }
}

impl FromStr for Sentiment {
    type Err = SentimentError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            "positive" => Ok(Sentiment::Positive),
            _ => Err(SentimentError::UnknownLabel(label.to_owned())),
        }
    }
}

/// A label and the model's confidence in it, within [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub label: Sentiment,
    pub probability: f64,
}

#[async_trait::async_trait]
pub trait SentimentModel: Send + Sync {
    async fn predict(&self, text: &str) -> Result<Prediction, SentimentError>;
}

/// Calls a remote classifier that answers `{"label": .., "probability": ..}`.
pub struct HttpSentimentModel {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    label: String,
    probability: f64,
}

impl HttpSentimentModel {
    pub fn new(url: impl Into<String>) -> Result<Self, SentimentError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl SentimentModel for HttpSentimentModel {
    async fn predict(&self, text: &str) -> Result<Prediction, SentimentError> {
        let response: PredictResponse = self
            .client
            .post(&self.url)
            .json(&PredictRequest { text })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Prediction {
            label: response.label.parse()?,
            probability: response.probability.clamp(0.0, 1.0),
        })
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "best", "better", "brilliant", "congrats", "congratulations", "excellent",
    "fantastic", "glad", "good", "great", "happy", "improve", "improved", "incredible", "love",
    "loved", "nice", "perfect", "proud", "recommend", "success", "thank", "thanks", "win", "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "awful", "bad", "broken", "crash", "disappointed", "disappointing", "fail", "failed",
    "failure", "hate", "horrible", "issue", "outage", "poor", "sad", "scam", "slow", "terrible",
    "useless", "worse", "worst", "wrong",
];

/// Word-counting fallback used when no remote classifier is configured.
pub struct LexiconSentimentModel {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl Default for LexiconSentimentModel {
    fn default() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
        }
    }
}

impl LexiconSentimentModel {
    pub fn classify(&self, text: &str) -> Prediction {
        let lowered = text.to_lowercase();
        let (mut positive, mut negative) = (0u32, 0u32);
        for word in lowered.split(|c: char| !c.is_alphanumeric()) {
            if self.positive.contains(word) {
                positive += 1;
            } else if self.negative.contains(word) {
                negative += 1;
            }
        }

        let total = positive + negative;
        if total == 0 || positive == negative {
            return Prediction {
                label: Sentiment::Neutral,
                probability: if total == 0 { 1.0 } else { 0.5 },
            };
        }

        let label = if positive > negative {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        };
        Prediction {
            label,
            probability: positive.max(negative) as f64 / total as f64,
        }
    }
}

#[async_trait::async_trait]
impl SentimentModel for LexiconSentimentModel {
    async fn predict(&self, text: &str) -> Result<Prediction, SentimentError> {
        Ok(self.classify(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_labels() {
        assert_eq!(Sentiment::Negative.signed(), -1.0);
        assert_eq!(Sentiment::Neutral.signed(), 0.0);
        assert_eq!(Sentiment::Positive.signed(), 1.0);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("positive".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("Negative".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!(" neutral ".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert!(matches!(
            "mixed".parse::<Sentiment>(),
            Err(SentimentError::UnknownLabel(label)) if label == "mixed"
        ));
    }

    #[test]
    fn test_lexicon_classify() {
        let model = LexiconSentimentModel::default();

        let p = model.classify("What a great release, thanks!");
        assert_eq!(p.label, Sentiment::Positive);
        assert_eq!(p.probability, 1.0);

        let p = model.classify("Terrible outage again. Good grief.");
        assert_eq!(p.label, Sentiment::Negative);
        assert!((p.probability - 2.0 / 3.0).abs() < 1e-12);

        let p = model.classify("The train leaves at nine.");
        assert_eq!(p.label, Sentiment::Neutral);
        assert_eq!(p.probability, 1.0);
    }
}
