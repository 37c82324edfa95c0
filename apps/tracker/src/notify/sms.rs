//! SMS delivery through a TextBelt-style HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::notify::transport::{DeliveryFailure, DeliveryMethod, DeliveryTransport};

pub const DEFAULT_SMS_API_URL: &str = "https://textbelt.com/text";

#[derive(Debug, Serialize)]
struct SendSmsRequest<'a> {
    phone: &'a str,
    message: String,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendSmsResponse {
    success: bool,
    #[serde(default)]
    text_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct SmsTransport {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl SmsTransport {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl DeliveryTransport for SmsTransport {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Sms
    }

    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, DeliveryFailure> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(DeliveryFailure::NotConfigured(
                "SMS not sent - no API key configured".to_string(),
            ));
        };

        // SMS has no subject line; prefix it onto the text.
        let request = SendSmsRequest {
            phone: recipient,
            message: format!("{subject}: {body}"),
            key: api_key,
        };

        let response = self.client.post(&self.api_url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeliveryFailure::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let reply: SendSmsResponse = response.json().await?;
        if !reply.success {
            return Err(DeliveryFailure::Rejected {
                status: status.as_u16(),
                message: reply.error.unwrap_or_else(|| "SMS rejected".to_string()),
            });
        }

        let id = reply.text_id.unwrap_or_else(|| "unknown".to_string());
        debug!("SMS sent to {recipient}: {id}");
        Ok(format!("SMS sent: {id}"))
    }
}
