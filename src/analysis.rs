//! Sentiment scoring and calendar bucketing of collected tweets.

use crate::sentiment::{Prediction, Sentiment, SentimentError, SentimentModel};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown period {0:?}")]
    UnknownPeriod(String),

    #[error("sentiment model failed: {0}")]
    Sentiment(#[from] SentimentError),
}

/// The columns of the flat tweet table the analysis reads. Other columns are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub author_id: String,
    pub created_at: DateTime<FixedOffset>,
    pub tweet_text: String,
    #[serde(default)]
    pub possibly_sensitive: Option<bool>,
    pub retweet_count: i64,
    pub reply_count: i64,
    pub like_count: i64,
    pub quote_count: i64,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl TweetRecord {
    pub fn engagement(&self) -> i64 {
        self.retweet_count + self.reply_count + self.like_count + self.quote_count
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredTweet {
    #[serde(flatten)]
    pub record: TweetRecord,
    pub label: Sentiment,
    /// Signed label: -1, 0 or +1.
    pub sentiment: f64,
    pub probability: f64,
    pub sentiment_score_1: f64,
    pub sentiment_score_2: f64,
}

/// Calendar granularity for resampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    Day,
}

impl Period {
    /// Start of the bucket holding `ts`, on the wall clock of its own offset.
    pub fn bucket(&self, ts: &DateTime<FixedOffset>) -> NaiveDateTime {
        match self {
            Period::Day => ts.date_naive().and_time(NaiveTime::MIN),
        }
    }

    /// Start of the bucket following the one starting at `start`.
    pub fn next(&self, start: NaiveDateTime) -> NaiveDateTime {
        match self {
            Period::Day => start + Duration::days(1),
        }
    }
}

impl FromStr for Period {
    type Err = AnalysisError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            _ => Err(AnalysisError::UnknownPeriod(key.to_owned())),
        }
    }
}

/// Mean of every numeric column over one period. Means are None for a period without tweets.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeriodMean {
    pub period: NaiveDateTime,
    pub tweet_count: usize,
    pub sentiment: Option<f64>,
    pub probability: Option<f64>,
    /// Share of flagged tweets among those that carry the flag.
    pub possibly_sensitive: Option<f64>,
    pub retweet_count: Option<f64>,
    pub reply_count: Option<f64>,
    pub like_count: Option<f64>,
    pub quote_count: Option<f64>,
    pub sentiment_score_1: Option<f64>,
    pub sentiment_score_2: Option<f64>,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    flagged: usize,
    sensitive: usize,
    sentiment: f64,
    probability: f64,
    retweet_count: f64,
    reply_count: f64,
    like_count: f64,
    quote_count: f64,
    sentiment_score_1: f64,
    sentiment_score_2: f64,
}

impl Accumulator {
    fn add(&mut self, tweet: &ScoredTweet) {
        self.count += 1;
        if let Some(sensitive) = tweet.record.possibly_sensitive {
            self.flagged += 1;
            self.sensitive += sensitive as usize;
        }
        self.sentiment += tweet.sentiment;
        self.probability += tweet.probability;
        self.retweet_count += tweet.record.retweet_count as f64;
        self.reply_count += tweet.record.reply_count as f64;
        self.like_count += tweet.record.like_count as f64;
        self.quote_count += tweet.record.quote_count as f64;
        self.sentiment_score_1 += tweet.sentiment_score_1;
        self.sentiment_score_2 += tweet.sentiment_score_2;
    }

    fn mean(&self, period: NaiveDateTime) -> PeriodMean {
        let n = self.count as f64;
        let mean = |sum: f64| (self.count > 0).then(|| sum / n);
        PeriodMean {
            period,
            tweet_count: self.count,
            sentiment: mean(self.sentiment),
            probability: mean(self.probability),
            possibly_sensitive: (self.flagged > 0)
                .then(|| self.sensitive as f64 / self.flagged as f64),
            retweet_count: mean(self.retweet_count),
            reply_count: mean(self.reply_count),
            like_count: mean(self.like_count),
            quote_count: mean(self.quote_count),
            sentiment_score_1: mean(self.sentiment_score_1),
            sentiment_score_2: mean(self.sentiment_score_2),
        }
    }
}

/// Per-tweet scores plus one resampled table. The HTTP layer presents that table under both
/// legacy keys.
#[derive(Clone, Debug, PartialEq)]
pub struct SentimentReport {
    pub tweets: Vec<ScoredTweet>,
    pub periods: Vec<PeriodMean>,
}

/// Drops tweets whose author is in `handles`. An empty list keeps everything.
pub fn exclude_handles(records: Vec<TweetRecord>, handles: &[String]) -> Vec<TweetRecord> {
    if handles.is_empty() {
        return records;
    }
    let excluded: HashSet<&str> = handles.iter().map(String::as_str).collect();
    records
        .into_iter()
        .filter(|record| !excluded.contains(record.author_id.as_str()))
        .collect()
}

pub fn score(record: TweetRecord, prediction: Prediction) -> ScoredTweet {
    let sentiment = prediction.label.signed();
    let sentiment_score_1 = sentiment * prediction.probability;
    let weight = (record.engagement() + 1) as f64;

    ScoredTweet {
        record,
        label: prediction.label,
        sentiment,
        probability: prediction.probability,
        sentiment_score_1,
        sentiment_score_2: sentiment_score_1 * weight,
    }
}

/// Means per period, ascending and contiguous from the first tweet's period to the last one's.
/// Periods in between without tweets are emitted with a zero count and no means.
pub fn resample(tweets: &[ScoredTweet], period: Period) -> Vec<PeriodMean> {
    let mut buckets: BTreeMap<NaiveDateTime, Accumulator> = BTreeMap::new();
    for tweet in tweets {
        buckets
            .entry(period.bucket(&tweet.record.created_at))
            .or_default()
            .add(tweet);
    }

    let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(),
    };
    let empty = Accumulator::default();
    let mut periods = Vec::new();
    let mut start = first;
    while start <= last {
        periods.push(buckets.get(&start).unwrap_or(&empty).mean(start));
        start = period.next(start);
    }
    periods
}

pub async fn analyse(
    records: Vec<TweetRecord>,
    excluded: &[String],
    period: Period,
    model: &dyn SentimentModel,
) -> Result<SentimentReport, AnalysisError> {
    let records = exclude_handles(records, excluded);
    log::info!("Scoring {} tweets.", records.len());

    let mut tweets = Vec::with_capacity(records.len());
    for record in records {
        let prediction = model.predict(&record.tweet_text).await?;
        tweets.push(score(record, prediction));
    }

    let periods = resample(&tweets, period);
    Ok(SentimentReport { tweets, periods })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(author: &str, created_at: &str, counts: [i64; 4]) -> TweetRecord {
        TweetRecord {
            author_id: author.to_owned(),
            created_at: DateTime::parse_from_rfc3339(created_at).unwrap(),
            tweet_text: format!("from {}", author),
            possibly_sensitive: Some(false),
            retweet_count: counts[0],
            reply_count: counts[1],
            like_count: counts[2],
            quote_count: counts[3],
            lang: Some("en".to_owned()),
            source: None,
        }
    }

    fn prediction(label: Sentiment, probability: f64) -> Prediction {
        Prediction { label, probability }
    }

    /// Answers by tweet author so tests can pin a label on each record.
    struct ByAuthor;

    #[async_trait::async_trait]
    impl SentimentModel for ByAuthor {
        async fn predict(&self, text: &str) -> Result<Prediction, SentimentError> {
            Ok(match text {
                "from @happy" => prediction(Sentiment::Positive, 0.5),
                "from @sad" => prediction(Sentiment::Negative, 0.5),
                _ => prediction(Sentiment::Neutral, 0.9),
            })
        }
    }

    #[test]
    fn test_exclude_handles() {
        let records = vec![
            record("@x", "2024-01-01T10:00:00Z", [0; 4]),
            record("@y", "2024-01-01T11:00:00Z", [0; 4]),
            record("@z", "2024-01-01T12:00:00Z", [0; 4]),
        ];

        let kept = exclude_handles(records.clone(), &["@x".to_owned()]);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.author_id != "@x"));

        assert_eq!(exclude_handles(records.clone(), &[]), records);
        assert_eq!(exclude_handles(records.clone(), &["@nobody".to_owned()]), records);
    }

    #[test]
    fn test_scores() {
        let scored = score(
            record("@x", "2024-01-01T10:00:00Z", [1, 2, 3, 4]),
            prediction(Sentiment::Negative, 0.75),
        );
        assert_eq!(scored.sentiment, -1.0);
        assert_eq!(scored.sentiment_score_1, -0.75);
        assert_eq!(scored.sentiment_score_2, -0.75 * 11.0);

        let scored = score(
            record("@x", "2024-01-01T10:00:00Z", [0; 4]),
            prediction(Sentiment::Positive, 0.3),
        );
        assert_eq!(scored.sentiment_score_2, scored.sentiment_score_1);

        let scored = score(
            record("@x", "2024-01-01T10:00:00Z", [5, 0, 7, 0]),
            prediction(Sentiment::Neutral, 0.99),
        );
        assert_eq!(scored.sentiment_score_1, 0.0);
        assert_eq!(scored.sentiment_score_2, 0.0);
    }

    #[test]
    fn test_score_two_is_weighted_score_one() {
        for (counts, p) in [([3, 1, 4, 1], 0.59), ([0, 0, 0, 0], 0.26), ([100, 7, 2, 9], 0.5358)] {
            let scored = score(
                record("@x", "2024-01-01T10:00:00Z", counts),
                prediction(Sentiment::Positive, p),
            );
            let weight = (counts.iter().sum::<i64>() + 1) as f64;
            assert_eq!(scored.sentiment_score_2, scored.sentiment_score_1 * weight);
        }
    }

    #[test]
    fn test_period_keys() {
        assert_eq!("day".parse::<Period>().unwrap(), Period::Day);
        assert_eq!("Day".parse::<Period>().unwrap(), Period::Day);
        assert!(matches!(
            "fortnight".parse::<Period>(),
            Err(AnalysisError::UnknownPeriod(_))
        ));
    }

    #[test]
    fn test_daily_resample_means() {
        let tweets = vec![
            score(
                record("@a", "2024-01-01T10:00:00Z", [2, 0, 0, 0]),
                prediction(Sentiment::Positive, 0.5),
            ),
            score(
                record("@b", "2024-01-01T22:00:00Z", [0, 0, 4, 0]),
                prediction(Sentiment::Negative, 0.5),
            ),
            score(
                record("@c", "2024-01-03T08:00:00Z", [0; 4]),
                prediction(Sentiment::Positive, 1.0),
            ),
        ];

        let periods = resample(&tweets, Period::Day);

        let day = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            periods.iter().map(|p| p.period).collect::<Vec<_>>(),
            vec![
                day("2024-01-01 00:00:00"),
                day("2024-01-02 00:00:00"),
                day("2024-01-03 00:00:00"),
            ]
        );

        let first = &periods[0];
        assert_eq!(first.tweet_count, 2);
        assert_eq!(first.sentiment_score_1, Some(0.0));
        assert_eq!(first.sentiment, Some(0.0));
        assert_eq!(first.probability, Some(0.5));
        assert_eq!(first.retweet_count, Some(1.0));
        assert_eq!(first.like_count, Some(2.0));
        // (0.5 * 3 + -0.5 * 5) / 2
        assert_eq!(first.sentiment_score_2, Some(-0.5));

        let gap = &periods[1];
        assert_eq!(gap.tweet_count, 0);
        assert_eq!(gap.sentiment, None);
        assert_eq!(gap.sentiment_score_2, None);
        assert_eq!(gap.possibly_sensitive, None);

        assert_eq!(periods[2].tweet_count, 1);
        assert_eq!(periods[2].sentiment_score_1, Some(1.0));
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample(&[], Period::Day).is_empty());
    }

    #[test]
    fn test_sensitive_share() {
        let mut flagged = record("@a", "2024-01-01T09:00:00Z", [0; 4]);
        flagged.possibly_sensitive = Some(true);
        let mut unflagged = record("@b", "2024-01-01T10:00:00Z", [0; 4]);
        unflagged.possibly_sensitive = None;
        let tweets: Vec<ScoredTweet> = vec![
            flagged,
            record("@c", "2024-01-01T11:00:00Z", [0; 4]),
            unflagged,
        ]
        .into_iter()
        .map(|r| score(r, prediction(Sentiment::Neutral, 1.0)))
        .collect();

        let periods = resample(&tweets, Period::Day);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].tweet_count, 3);
        assert_eq!(periods[0].possibly_sensitive, Some(0.5));
    }

    #[test]
    fn test_bucket_uses_own_offset() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T23:30:00-05:00").unwrap();
        assert_eq!(
            Period::Day.bucket(&ts),
            NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
    }

    #[actix_rt::test]
    async fn test_analyse_filters_then_scores() {
        let records = vec![
            record("@happy", "2024-01-01T10:00:00Z", [0; 4]),
            record("@sad", "2024-01-01T22:00:00Z", [0; 4]),
            record("@bot", "2024-01-01T23:00:00Z", [50; 4]),
        ];

        let report = analyse(records, &["@bot".to_owned()], Period::Day, &ByAuthor)
            .await
            .unwrap();

        assert_eq!(report.tweets.len(), 2);
        assert_eq!(report.periods.len(), 1);
        assert_eq!(report.periods[0].sentiment_score_1, Some(0.0));
        assert_eq!(report.periods[0].tweet_count, 2);
    }

    #[test]
    fn test_record_reads_scrape_columns() {
        let value = serde_json::json!({
            "tweet_id": "1",
            "author_id": "10",
            "created_at": "2024-01-01T10:00:00+00:00",
            "tweet_text": "hello",
            "retweet_count": 1,
            "reply_count": 0,
            "like_count": 2,
            "quote_count": 0,
            "conversation_id": "1"
        });
        let record: TweetRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.engagement(), 3);
        assert_eq!(record.lang, None);
    }
}
