//! Rewrites plain-text framework rejections into the `{"error": ...}` shape

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Body-limit (413) and timeout (408) rejections are produced by layers below
/// the handlers and carry text bodies. Anything already JSON passes through.
pub async fn json_error_bodies(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if is_json(&response) {
        return response;
    }

    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge.into_response(),
        StatusCode::REQUEST_TIMEOUT => AppError::Timeout.into_response(),
        _ => response,
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .map(|m| m.subtype() == mime::JSON)
        .unwrap_or(false)
}
