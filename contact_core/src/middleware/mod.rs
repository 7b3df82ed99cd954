//! Middleware components for the HTTP server

pub mod cors;
pub mod json_errors;
pub mod logging;
pub mod rate_limit;
