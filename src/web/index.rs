use actix_web::{get, web, Error, Responder};
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index);
}

#[get("/")]
async fn view_index() -> Result<impl Responder, Error> {
    Ok(web::Json(json!({ "message": "tweet sentiment analysis" })))
}
