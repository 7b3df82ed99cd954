//! The contact relay: validate one submission and attempt one delivery

use super::{
    message::OutboundMessage,
    submission::SubmissionFields,
    transport::{DeliveryAck, MailTransport},
};
use crate::{
    config::ContactConfig,
    error::{AppError, Result},
};
use axum::http::Method;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ContactRelay {
    config: ContactConfig,
    transport: Arc<dyn MailTransport>,
}

impl ContactRelay {
    pub fn new(config: ContactConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ContactConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Checks run in a fixed order: method, fields, configuration. Only when
    /// all pass is the transport called, exactly once.
    pub async fn relay(&self, method: &Method, fields: SubmissionFields) -> Result<DeliveryAck> {
        if *method != Method::POST {
            warn!(%method, "Rejected contact request with unsupported method");
            return Err(AppError::MethodNotAllowed);
        }

        let submission = fields.into_submission().ok_or_else(|| {
            warn!("Rejected contact submission with missing fields");
            AppError::BadRequest("Missing fields".to_string())
        })?;

        let settings = self.config.smtp_settings().ok_or(AppError::NotConfigured)?;

        let message = OutboundMessage::compose(&submission, &settings, &self.config.to);

        match self.transport.send(&settings, message).await {
            Ok(ack) => {
                info!(code = %ack.code, "Contact submission delivered");
                Ok(ack)
            }
            Err(e) => {
                error!(error = %e, "Contact submission delivery failed");
                Err(AppError::SendFailed)
            }
        }
    }
}
