use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use std::sync::Arc;
use tweetscope::config::Settings;
use tweetscope::db::init_db;
use tweetscope::persist::create_schema;
use tweetscope::sentiment::{HttpSentimentModel, LexiconSentimentModel, SentimentModel};
use tweetscope::twitter::TwitterApi;
use tweetscope::web::{self, error, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();
    let settings = Settings::from_env()?;

    let db = match &settings.database_url {
        Some(url) => {
            let db = init_db(url).await?;
            create_schema(&db).await?;
            Some(db)
        }
        None => {
            log::warn!("DATABASE_URL is not set, scraped sessions will not be persisted.");
            None
        }
    };

    let sentiment: Arc<dyn SentimentModel> = match &settings.sentiment_url {
        Some(url) => {
            log::info!("Using remote sentiment model at {}.", url);
            Arc::new(HttpSentimentModel::new(url.to_owned())?)
        }
        None => {
            log::info!("SENTIMENT_URL is not set, using the lexicon sentiment model.");
            Arc::new(LexiconSentimentModel::default())
        }
    };

    let state = Data::new(AppState {
        search: Arc::new(TwitterApi::new(&settings)?),
        sentiment,
        db,
    });

    log::info!("Listening on {}.", settings.bind_addr);
    HttpServer::new(move || {
        // Order of middleware is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(state.clone())
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, error::render_404)
                    .handler(StatusCode::UNPROCESSABLE_ENTITY, error::render_422)
                    .handler(StatusCode::INTERNAL_SERVER_ERROR, error::render_500)
                    .handler(StatusCode::BAD_GATEWAY, error::render_502),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(web::configure)
    })
    .bind(&settings.bind_addr)?
    .run()
    .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // A missing .env is fine; the environment may already carry everything.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
