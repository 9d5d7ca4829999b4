use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::ServiceResponse;
use actix_web::error::{self, JsonPayloadError};
use actix_web::http::{header, header::HeaderValue};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{Error, HttpRequest, Result};
use serde_json::json;

/// Rewrites an error response into a JSON document, `{"status": .., "error": ..}`.
pub fn error_document<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    let message = match res.response().error() {
        Some(err) => err.to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_owned(),
    };
    let body = BoxBody::new(
        json!({
            "status": status.as_u16(),
            "error": message,
        })
        .to_string(),
    );
    let mut res: ServiceResponse<EitherBody<B>> =
        res.map_body(|_, _| EitherBody::<B, BoxBody>::right(body));

    // Actix renders no content by default, so the headers are ours to set.
    let headers = res.response_mut().headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    // Proxies love to cache error responses permanently.
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(ErrorHandlerResponse::Response(res))
}

pub fn render_404<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    error_document::<B>(res)
}

pub fn render_422<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    error_document::<B>(res)
}

pub fn render_500<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    error_document::<B>(res)
}

pub fn render_502<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    error_document::<B>(res)
}

/// Request bodies that do not match the input schema are a validation failure, not a 400.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    log::debug!("Rejected request body: {}", err);
    match err {
        JsonPayloadError::ContentType => error::ErrorUnsupportedMediaType(err),
        err => error::ErrorUnprocessableEntity(err),
    }
}
