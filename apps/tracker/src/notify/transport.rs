use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Email,
    Sms,
    Log,
    None,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Email => "email",
            DeliveryMethod::Sms => "sms",
            DeliveryMethod::Log => "log",
            DeliveryMethod::None => "none",
        }
    }
}

/// Soft failure of one delivery attempt. Recorded, never propagated past the notifier.
#[derive(Debug, Error)]
pub enum DeliveryFailure {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// A channel is enabled but its credentials are not configured.
    #[error("{0}")]
    NotConfigured(String),
}

/// `deliver(recipient, subject, body)`; email, SMS and log-only all implement it.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    fn method(&self) -> DeliveryMethod;

    /// Returns a transport-specific detail (message id, etc.) on success.
    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, DeliveryFailure>;
}

/// Records the message in the process log instead of sending it.
pub struct LogTransport;

#[async_trait]
impl DeliveryTransport for LogTransport {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Log
    }

    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, DeliveryFailure> {
        info!("[NOTIFICATION TO {recipient}] {subject}: {body}");
        Ok("Notification logged (not sent)".to_string())
    }
}
