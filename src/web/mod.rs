pub mod error;
pub mod index;
pub mod scrape;
pub mod sentiment;
pub mod table;

use crate::sentiment::SentimentModel;
use crate::twitter::SearchApi;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Collaborators shared by every worker.
pub struct AppState {
    pub search: Arc<dyn SearchApi>,
    pub sentiment: Arc<dyn SentimentModel>,
    /// None when no database is configured; `/scrape` then never persists.
    pub db: Option<DatabaseConnection>,
}

/// Configures the web app
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.app_data(actix_web::web::JsonConfig::default().error_handler(error::json_error));

    index::configure(conf);
    scrape::configure(conf);
    sentiment::configure(conf);
}
