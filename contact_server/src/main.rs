//! Main entry point for the contact relay server binary

use anyhow::Result;
use contact_core::{create_app_with_config, run_server, AppConfig, AppState};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    info!(
        "Environment: {}",
        std::env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string())
    );

    let state = AppState::new(config.contact.clone());

    info!("App: {} v{}", state.app_name, state.version);
    if state.relay.is_configured() {
        info!(
            port = config.contact.smtp_port,
            "Contact relay ready, delivering to configured recipient"
        );
    } else {
        warn!("Contact relay has no SMTP configuration; submissions will answer 500");
    }
    if config.rate_limit.enable {
        info!(
            "Rate limiting enabled: {} requests per {}s",
            config.rate_limit.max_requests, config.rate_limit.window_seconds
        );
    }

    let app = create_app_with_config(state, &config);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        };

        default_directives(default_level).into()
    });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}

/// Events from this binary are targeted at its crate name (`server`), not the
/// package name.
fn default_directives(level: &str) -> String {
    format!(
        "{crate_name}={level},contact_core={level},tower_http=debug,axum=debug",
        crate_name = env!("CARGO_CRATE_NAME").replace('-', "_"),
        level = level
    )
}
