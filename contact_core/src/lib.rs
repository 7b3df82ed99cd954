//! Core library for the portfolio contact relay: configuration, the relay
//! itself, its mail transport and the HTTP surface around it.

pub mod config;
pub mod contact;
pub mod error;
pub mod handlers;
pub mod middleware;

pub use config::{AppConfig, ContactConfig, SmtpSettings};
pub use contact::{
    ContactRelay, DeliveryAck, MailTransport, OutboundMessage, SmtpMailTransport, Submission,
    SubmissionFields, TransportError,
};
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use middleware::cors::{cors_layer_from_config, cors_layer_permissive};
pub use middleware::rate_limit::RateLimiter;

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, Router};
use chrono::{DateTime, Utc};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub relay: ContactRelay,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(contact: ContactConfig) -> Self {
        Self::with_transport(contact, Arc::new(SmtpMailTransport::new()))
    }

    pub fn with_transport(contact: ContactConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            app_name: "Portfolio Contact Relay".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            relay: ContactRelay::new(contact, transport),
            started_at: Utc::now(),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, &AppConfig::default())
}

pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new().merge(create_routes());

    router = router.layer(DefaultBodyLimit::max(config.server.max_body_bytes));

    // Inside CORS: preflights are answered before reaching the limiter, and
    // 429 responses still carry the allow-origin headers.
    if config.rate_limit.enable {
        router = router.layer(axum_middleware::from_fn_with_state(
            RateLimiter::new(&config.rate_limit),
            middleware::rate_limit::rate_limit_middleware,
        ));
    }

    router = router.layer(middleware::cors::cors_layer_from_config(&config.cors));

    router = router.layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_seconds,
    )));

    router = router.layer(axum_middleware::from_fn(
        middleware::json_errors::json_error_bodies,
    ));

    router = router.layer(axum_middleware::from_fn(
        middleware::logging::propagate_request_id,
    ));

    router = router.layer(middleware::logging::logging_layer());

    router.with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
