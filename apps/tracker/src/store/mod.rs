//! Record store seam. The polling pipeline and the retention sweeper only ever
//! talk to flights and passengers through [`FlightStore`].
//!
//! `PgFlightStore` is the production backend; `MemoryStore` backs the tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Flight, FlightStatus, Passenger, StatusChange};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgFlightStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Flight {0} not found")]
    FlightNotFound(Uuid),
}

/// Selection filter for the poll scheduler's batch query.
#[derive(Debug, Clone, Copy)]
pub struct ActiveFlightFilter {
    /// Only flights scheduled to depart at or after this instant.
    pub departing_after: DateTime<Utc>,
}

/// Everything one successful status check writes back for a flight.
///
/// Applied atomically: the flight columns are updated, the notification flag
/// is claimed if asked, and exactly one history entry is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPatch {
    pub status: FlightStatus,
    pub delay_minutes: u32,
    pub checked_at: DateTime<Utc>,
    /// Clears `notification_sent` so the next delay episode notifies again.
    pub rearm_notification: bool,
    /// Compare-and-swap `notification_sent` from false to true in the same write.
    pub claim_notification: bool,
}

#[async_trait]
pub trait FlightStore: Send + Sync {
    /// Non-terminal, non-archived flights inside the lookback window.
    async fn find_active_flights(&self, filter: ActiveFlightFilter)
        -> Result<Vec<Flight>, StoreError>;

    /// Returns whether this write won the notification claim. Always false
    /// when the patch does not ask for one.
    async fn update_flight_status(&self, id: Uuid, patch: &StatusPatch)
        -> Result<bool, StoreError>;

    async fn find_passengers_by_flight(&self, flight_id: Uuid)
        -> Result<Vec<Passenger>, StoreError>;

    async fn status_history(&self, flight_id: Uuid) -> Result<Vec<StatusChange>, StoreError>;

    /// Archives every flight scheduled before `cutoff`. Returns rows changed.
    async fn archive_flights_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Archives passengers whose flights are all archived. Returns rows changed.
    async fn archive_orphaned_passengers(&self) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
