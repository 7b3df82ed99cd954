//! Layered configuration: defaults, optional `config.toml`, then environment

pub mod settings;

pub use settings::{
    AppConfig, ContactConfig, CorsConfig, RateLimitConfig, ServerConfig, SmtpSettings,
    DEFAULT_CONTACT_TO, DEFAULT_SMTP_PORT,
};
