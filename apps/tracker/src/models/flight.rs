use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Internal flight status. Stored as its display string ("In Air", not "InAir").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightStatus {
    Scheduled,
    Delayed,
    Cancelled,
    #[serde(rename = "In Air", alias = "InAir")]
    InAir,
    Landed,
    Unknown,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "Scheduled",
            FlightStatus::Delayed => "Delayed",
            FlightStatus::Cancelled => "Cancelled",
            FlightStatus::InAir => "In Air",
            FlightStatus::Landed => "Landed",
            FlightStatus::Unknown => "Unknown",
        }
    }

    /// Landed and Cancelled flights are never polled again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlightStatus::Landed | FlightStatus::Cancelled)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(FlightStatus::Scheduled),
            "Delayed" => Ok(FlightStatus::Delayed),
            "Cancelled" => Ok(FlightStatus::Cancelled),
            "In Air" | "InAir" => Ok(FlightStatus::InAir),
            "Landed" => Ok(FlightStatus::Landed),
            "Unknown" => Ok(FlightStatus::Unknown),
            other => Err(format!("unrecognised flight status '{other}'")),
        }
    }
}

/// Row shape of the `flights` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FlightRow {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub status: String,
    pub delay_minutes: i32,
    pub last_checked: Option<DateTime<Utc>>,
    pub notification_sent: bool,
    pub archived: bool,
}

/// A tracked flight as the polling pipeline sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub status: FlightStatus,
    pub delay_minutes: u32,
    pub last_checked: Option<DateTime<Utc>>,
    pub notification_sent: bool,
    pub archived: bool,
}

impl Flight {
    /// Hours until scheduled departure; negative once the departure time has passed.
    pub fn hours_to_departure(&self, now: DateTime<Utc>) -> f64 {
        (self.scheduled_departure - now).num_seconds() as f64 / 3600.0
    }

    /// Estimated departure once the reported delay is applied.
    pub fn estimated_departure(&self) -> DateTime<Utc> {
        self.scheduled_departure + chrono::Duration::minutes(i64::from(self.delay_minutes))
    }
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            tracing::warn!("Flight {} has {e}; treating as Unknown", row.id);
            FlightStatus::Unknown
        });
        Self {
            id: row.id,
            flight_number: row.flight_number,
            airline: row.airline,
            departure_airport: row.departure_airport,
            arrival_airport: row.arrival_airport,
            scheduled_departure: row.scheduled_departure,
            scheduled_arrival: row.scheduled_arrival,
            status,
            delay_minutes: row.delay_minutes.max(0) as u32,
            last_checked: row.last_checked,
            notification_sent: row.notification_sent,
            archived: row.archived,
        }
    }
}

/// One entry of a flight's append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub status: FlightStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct StatusChangeRow {
    pub status: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<StatusChangeRow> for StatusChange {
    fn from(row: StatusChangeRow) -> Self {
        Self {
            status: row.status.parse().unwrap_or(FlightStatus::Unknown),
            timestamp: row.recorded_at,
        }
    }
}
