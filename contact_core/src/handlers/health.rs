//! Service banner and health probes

use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use tracing::{debug, warn};

pub async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "app": state.app_name,
        "version": state.version,
        "endpoints": {
            "contact": "POST /api/contact",
            "health": "GET /health"
        }
    }))
}

/// Reports whether the relay can send mail without revealing how it is
/// configured.
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /health");

    let contact_configured = state.relay.is_configured();
    if !contact_configured {
        warn!("Health check: contact relay has no SMTP configuration");
    }

    let status = if contact_configured { "healthy" } else { "degraded" };
    let now = chrono::Utc::now();
    let uptime_seconds = now.signed_duration_since(state.started_at).num_seconds().max(0);

    Json(serde_json::json!({
        "status": status,
        "version": state.version,
        "timestamp": now.timestamp(),
        "uptime_seconds": uptime_seconds,
        "contact_configured": contact_configured
    }))
}
