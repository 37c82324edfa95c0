use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{Flight, FlightStatus};
use crate::tracking::provider::{FetchFailure, FlightStatusProvider, ProviderFlight};
use crate::tracking::status_map::StatusMapper;

/// What the provider said about a flight, already mapped to internal terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalStatusSnapshot {
    pub raw_status: Option<String>,
    pub status: FlightStatus,
    pub delay_minutes: u32,
    pub fetched_at: DateTime<Utc>,
}

pub struct StatusFetcher {
    provider: Arc<dyn FlightStatusProvider>,
    mapper: StatusMapper,
}

impl StatusFetcher {
    pub fn new(provider: Arc<dyn FlightStatusProvider>, mapper: StatusMapper) -> Self {
        Self { provider, mapper }
    }

    pub async fn fetch(&self, flight: &Flight) -> Result<ExternalStatusSnapshot, FetchFailure> {
        if flight.status.is_terminal() {
            return Err(FetchFailure::Terminal(flight.flight_number.clone()));
        }

        let reported = self
            .provider
            .lookup(
                &flight.flight_number,
                flight.scheduled_departure.date_naive(),
            )
            .await?;

        Ok(ExternalStatusSnapshot {
            status: self.mapper.map(reported.status.as_deref()),
            delay_minutes: delay_minutes(&reported),
            raw_status: reported.status,
            fetched_at: Utc::now(),
        })
    }
}

/// Whole minutes between scheduled and actual departure, floored and never negative.
/// Zero unless the provider reports both times.
pub fn delay_minutes(reported: &ProviderFlight) -> u32 {
    match (reported.scheduled_departure(), reported.actual_departure()) {
        (Some(scheduled), Some(actual)) => {
            let seconds = (actual - scheduled).num_seconds();
            if seconds <= 0 {
                0
            } else {
                u32::try_from(seconds / 60).unwrap_or(u32::MAX)
            }
        }
        _ => 0,
    }
}
