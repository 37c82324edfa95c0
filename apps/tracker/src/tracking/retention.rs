use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::store::{FlightStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub cutoff: Option<DateTime<Utc>>,
    pub flights_archived: u64,
    pub passengers_archived: u64,
}

/// Archives flights whose scheduled departure is older than the retention
/// window, then passengers left with no active flight. Safe to repeat.
pub struct RetentionSweeper {
    store: Arc<dyn FlightStore>,
    retention_months: u32,
    running: Mutex<()>,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn FlightStore>, retention_months: u32) -> Self {
        Self {
            store,
            retention_months,
            running: Mutex::new(()),
        }
    }

    /// Returns `Ok(None)` when another sweep is already in progress.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<Option<SweepReport>, StoreError> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("Retention sweep already running; skipping");
            return Ok(None);
        };

        let cutoff = now
            .checked_sub_months(Months::new(self.retention_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        // Flights first, so their passengers become orphans in the same sweep.
        let flights_archived = self.store.archive_flights_before(cutoff).await?;
        let passengers_archived = self.store.archive_orphaned_passengers().await?;

        info!(
            "Retention sweep (cutoff {cutoff}): archived {flights_archived} flights, {passengers_archived} passengers"
        );
        Ok(Some(SweepReport {
            cutoff: Some(cutoff),
            flights_archived,
            passengers_archived,
        }))
    }
}
