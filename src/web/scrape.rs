use super::table::{to_columns, ColumnTable};
use super::AppState;
use crate::decompose::decompose;
use crate::persist::commit_tables;
use crate::twitter::Collector;
use actix_web::{error, post, web, Error, Responder};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_scrape);
}

#[derive(Deserialize)]
pub struct ScrapeInput {
    pub search_string: String,
    pub since_id: Option<String>,
    pub limit_tweets: Option<usize>,
    /// Commit the session to the database, if one is configured.
    #[serde(default)]
    pub persist: bool,
}

#[derive(Serialize)]
pub struct ScrapeOutput {
    pub tweets: ColumnTable,
    pub users: ColumnTable,
    /// False when pagination stopped on a failed page.
    pub complete: bool,
}

#[post("/scrape")]
async fn post_scrape(
    state: web::Data<AppState>,
    input: web::Json<ScrapeInput>,
) -> Result<impl Responder, Error> {
    let input = input.into_inner();

    let mut collector = Collector::connect(state.search.as_ref(), input.search_string)
        .await
        .map_err(|e| {
            log::error!("Authentication failed: {}", e);
            error::ErrorBadGateway(e)
        })?;
    if let Some(since_id) = input.since_id {
        collector = collector.since_id(since_id);
    }
    if let Some(limit) = input.limit_tweets {
        collector = collector.limit(limit);
    }

    let collected = collector.collect().await;
    let tables = decompose(&collected).map_err(|e| {
        log::error!("Decomposition failed: {}", e);
        error::ErrorInternalServerError(e)
    })?;

    if input.persist {
        match &state.db {
            Some(db) => commit_tables(db, &tables)
                .await
                .map_err(error::ErrorInternalServerError)?,
            None => log::warn!("Persistence requested but no database is configured."),
        }
    }

    Ok(web::Json(ScrapeOutput {
        tweets: to_columns(&tables.tweets).map_err(error::ErrorInternalServerError)?,
        users: to_columns(&tables.users).map_err(error::ErrorInternalServerError)?,
        complete: collected.outcome.is_complete(),
    }))
}
