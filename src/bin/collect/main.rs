use anyhow::Context;
use env_logger::Env;
use tweetscope::config::Settings;
use tweetscope::db::init_db;
use tweetscope::decompose::decompose;
use tweetscope::persist::{commit_tables, create_schema};
use tweetscope::twitter::{Collector, TwitterApi};

// Collects one search session and commits it to DATABASE_URL.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let search_term = args
        .next()
        .context("usage: collect <search term> [since_id]")?;
    let since_id = args.next();

    let settings = Settings::from_env()?;
    let database_url = settings
        .database_url
        .to_owned()
        .context("DATABASE_URL must be set.")?;

    let api = TwitterApi::new(&settings)?;
    let mut collector = Collector::connect(&api, search_term).await?;
    if let Some(since_id) = since_id {
        collector = collector.since_id(since_id);
    }
    let collected = collector.collect().await;
    if !collected.outcome.is_complete() {
        log::warn!("Collection ended early: {:?}", collected.outcome);
    }

    let tables = decompose(&collected)?;

    let db = init_db(&database_url).await?;
    create_schema(&db).await?;
    commit_tables(&db, &tables).await?;

    for (table, rows) in tables.counts() {
        log::info!("{}: {} rows", table, rows);
    }
    log::info!("Completed.");
    Ok(())
}
