//! Email delivery through an HTTP mail relay (Resend/Mailgun-style JSON API).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::notify::transport::{DeliveryFailure, DeliveryMethod, DeliveryTransport};

#[derive(Debug, Clone)]
pub struct EmailCredentials {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    #[serde(default)]
    id: Option<String>,
}

pub struct EmailTransport {
    client: Client,
    credentials: Option<EmailCredentials>,
}

impl EmailTransport {
    /// `None` credentials keep the channel constructible; every send then fails
    /// with `NotConfigured` instead of taking the process down.
    pub fn new(credentials: Option<EmailCredentials>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            credentials,
        }
    }
}

#[async_trait]
impl DeliveryTransport for EmailTransport {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Email
    }

    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, DeliveryFailure> {
        let Some(credentials) = &self.credentials else {
            warn!("[EMAIL NOT SENT - NO CREDENTIALS] To: {recipient}, Subject: {subject}");
            return Err(DeliveryFailure::NotConfigured(
                "Email not sent - no credentials configured".to_string(),
            ));
        };

        let request = SendEmailRequest {
            from: &credentials.from,
            to: recipient,
            subject,
            text: body,
            html: format!("<p>{}</p>", body.replace('\n', "<br>")),
        };

        let response = self
            .client
            .post(&credentials.api_url)
            .bearer_auth(&credentials.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeliveryFailure::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|r| r.id)
            .unwrap_or_else(|| "unknown".to_string());
        debug!("Email sent to {recipient}: {id}");
        Ok(format!("Email sent: {id}"))
    }
}
