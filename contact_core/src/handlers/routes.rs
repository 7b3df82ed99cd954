//! Route table

use crate::{
    error::AppError,
    handlers::{contact::handle_contact, health},
    AppState,
};
use axum::{
    routing::{any, get},
    Router,
};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::handle_root))
        .route("/health", get(health::handle_health))
        .route("/api/contact", any(handle_contact))
        .fallback(handle_not_found)
}

async fn handle_not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
