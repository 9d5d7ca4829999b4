use super::table::{from_columns, to_columns, ColumnTable};
use super::AppState;
use crate::analysis::{analyse, AnalysisError, Period, TweetRecord};
use actix_web::{error, post, web, Error, Responder};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_sentiment);
}

fn default_period() -> String {
    "day".to_owned()
}

#[derive(Deserialize)]
pub struct SentimentInput {
    pub tweets: ColumnTable,
    #[serde(default)]
    pub exclude_handles: Vec<String>,
    #[serde(default = "default_period")]
    pub period: String,
}

#[derive(Serialize)]
pub struct SentimentOutput {
    pub tweet_sentiment_table: ColumnTable,
    pub sentiment_table_1: ColumnTable,
    pub sentiment_table_2: ColumnTable,
}

#[post("/sentiment")]
async fn post_sentiment(
    state: web::Data<AppState>,
    input: web::Json<SentimentInput>,
) -> Result<impl Responder, Error> {
    let input = input.into_inner();

    let period: Period = input
        .period
        .parse()
        .map_err(error::ErrorUnprocessableEntity)?;
    let records: Vec<TweetRecord> =
        from_columns(&input.tweets).map_err(error::ErrorUnprocessableEntity)?;

    let report = analyse(
        records,
        &input.exclude_handles,
        period,
        state.sentiment.as_ref(),
    )
    .await
    .map_err(|e| {
        log::error!("Sentiment analysis failed: {}", e);
        match e {
            AnalysisError::UnknownPeriod(_) => error::ErrorUnprocessableEntity(e),
            AnalysisError::Sentiment(_) => error::ErrorBadGateway(e),
        }
    })?;

    let periods = to_columns(&report.periods).map_err(error::ErrorInternalServerError)?;
    Ok(web::Json(SentimentOutput {
        tweet_sentiment_table: to_columns(&report.tweets)
            .map_err(error::ErrorInternalServerError)?,
        sentiment_table_1: periods.clone(),
        sentiment_table_2: periods,
    }))
}
