//! Contact form endpoint

use crate::{contact::SubmissionFields, error::Result, AppState};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
    response::IntoResponse,
    Json,
};
use tracing::info;

/// Every method is routed here so the relay owns the method check and the
/// `405` body matches the other relay outcomes.
pub async fn handle_contact(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    info!("{} /api/contact - {} byte body", method, body.len());

    let fields = SubmissionFields::from_body(&headers, &body);
    state.relay.relay(&method, fields).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
