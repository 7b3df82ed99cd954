#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use contact_core::{
    create_app_with_config, AppConfig, AppState, ContactConfig, DeliveryAck, MailTransport,
    OutboundMessage, SmtpSettings, TransportError,
};
use axum::extract::ConnectInfo;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Records every send and optionally fails it.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(SmtpSettings, OutboundMessage)>>,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
}

impl RecordingTransport {
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// Waits `delay` before recording, so a timed-out request never counts.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(
        &self,
        settings: &SmtpSettings,
        message: OutboundMessage,
    ) -> Result<DeliveryAck, TransportError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().push((settings.clone(), message));
        match &self.fail_with {
            Some(reason) => Err(TransportError::Smtp(reason.clone())),
            None => Ok(DeliveryAck {
                code: "250".to_string(),
            }),
        }
    }
}

pub fn configured_contact() -> ContactConfig {
    ContactConfig {
        smtp_host: Some("smtp.example.com".to_string()),
        smtp_port: 587,
        smtp_user: Some("site@example.com".to_string()),
        smtp_pass: Some("s3cret-pass".to_string()),
        to: "owner@example.com".to_string(),
        ..ContactConfig::default()
    }
}

pub fn app_with(contact: ContactConfig, transport: Arc<RecordingTransport>) -> Router {
    let state = AppState::with_transport(contact, transport);
    create_app_with_config(state, &AppConfig::default())
}

/// Attaches the peer address the server would record for a real connection.
pub fn from_client(mut request: Request<Body>, addr: &str) -> Request<Body> {
    let addr: SocketAddr = addr.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
