//! Flight-status provider client, the only code that talks to the external
//! flight API. Everything it returns is untrusted: any field may be missing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://aerodatabox.p.rapidapi.com/flights";
pub const DEFAULT_API_HOST: &str = "aerodatabox.p.rapidapi.com";

/// Soft failure of a single status lookup. Never fatal to a tick.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Provider returned no data for {0}")]
    NoData(String),

    #[error("Flight {0} is terminal; not fetched")]
    Terminal(String),
}

/// One flight entry as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderFlight {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub departure: Option<ProviderMovement>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMovement {
    #[serde(default)]
    pub scheduled_time: Option<ProviderTime>,
    #[serde(default)]
    pub actual_time: Option<ProviderTime>,
}

/// Providers disagree on time encoding: a bare string or `{ "utc": ..., "local": ... }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProviderTime {
    Text(String),
    Zoned {
        #[serde(default)]
        utc: Option<String>,
    },
}

impl ProviderTime {
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let raw = match self {
            ProviderTime::Text(s) => s.as_str(),
            ProviderTime::Zoned { utc } => utc.as_deref()?,
        };
        parse_provider_time(raw)
    }
}

impl ProviderFlight {
    pub fn scheduled_departure(&self) -> Option<DateTime<Utc>> {
        self.departure
            .as_ref()?
            .scheduled_time
            .as_ref()?
            .to_utc()
    }

    pub fn actual_departure(&self) -> Option<DateTime<Utc>> {
        self.departure.as_ref()?.actual_time.as_ref()?.to_utc()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderResponse {
    List(Vec<ProviderFlight>),
    Wrapped {
        #[serde(default)]
        flights: Vec<ProviderFlight>,
    },
}

/// Accepts RFC 3339 plus the provider's `yyyy-MM-dd HH:mmZ` shorthand.
fn parse_provider_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M%#z", "%Y-%m-%d %H:%M%:z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    let stripped = raw.strip_suffix('Z').unwrap_or(raw);
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Lookup by flight number and departure date.
#[async_trait]
pub trait FlightStatusProvider: Send + Sync {
    async fn lookup(
        &self,
        flight_number: &str,
        date: NaiveDate,
    ) -> Result<ProviderFlight, FetchFailure>;
}

#[derive(Clone)]
pub struct AeroDataBoxClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
}

impl AeroDataBoxClient {
    pub fn new(base_url: String, api_key: String, api_host: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_host,
        }
    }
}

#[async_trait]
impl FlightStatusProvider for AeroDataBoxClient {
    async fn lookup(
        &self,
        flight_number: &str,
        date: NaiveDate,
    ) -> Result<ProviderFlight, FetchFailure> {
        let url = format!(
            "{}/number/{}/{}",
            self.base_url,
            flight_number,
            date.format("%Y-%m-%d")
        );

        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
            return Err(FetchFailure::NoData(flight_number.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchFailure::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchFailure::NoData(flight_number.to_string()));
        }

        let flights = match serde_json::from_str::<ProviderResponse>(&body)? {
            ProviderResponse::List(flights) => flights,
            ProviderResponse::Wrapped { flights } => flights,
        };
        debug!(
            "Provider returned {} entries for {flight_number} on {date}",
            flights.len()
        );

        flights
            .into_iter()
            .next()
            .ok_or_else(|| FetchFailure::NoData(flight_number.to_string()))
    }
}
