use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::flight::{FlightRow, StatusChangeRow};
use crate::models::passenger::PassengerRow;
use crate::models::{Flight, FlightStatus, Passenger, StatusChange};
use crate::store::{ActiveFlightFilter, FlightStore, StatusPatch, StoreError};

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct PgFlightStore {
    pool: PgPool,
}

impl PgFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `delay_minutes` is a non-negative INT column; oversized delays saturate.
fn delay_column(minutes: u32) -> i32 {
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

#[async_trait]
impl FlightStore for PgFlightStore {
    async fn find_active_flights(
        &self,
        filter: ActiveFlightFilter,
    ) -> Result<Vec<Flight>, StoreError> {
        let rows = sqlx::query_as::<_, FlightRow>(
            r#"
            SELECT id, flight_number, airline, departure_airport, arrival_airport,
                   scheduled_departure, scheduled_arrival, status, delay_minutes,
                   last_checked, notification_sent, archived
            FROM flights
            WHERE status NOT IN ($1, $2)
              AND archived = FALSE
              AND scheduled_departure >= $3
            ORDER BY scheduled_departure ASC
            "#,
        )
        .bind(FlightStatus::Landed.as_str())
        .bind(FlightStatus::Cancelled.as_str())
        .bind(filter.departing_after)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn update_flight_status(
        &self,
        id: Uuid,
        patch: &StatusPatch,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock: concurrent writers serialise here, so only one sees the flag unset.
        let previous: Option<bool> =
            sqlx::query_scalar("SELECT notification_sent FROM flights WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previously_sent) = previous else {
            return Err(StoreError::FlightNotFound(id));
        };

        let armed_sent = previously_sent && !patch.rearm_notification;
        let claimed = patch.claim_notification && !armed_sent;

        sqlx::query(
            r#"
            UPDATE flights
            SET status = $1,
                delay_minutes = $2,
                last_checked = $3,
                notification_sent = $4,
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(patch.status.as_str())
        .bind(delay_column(patch.delay_minutes))
        .bind(patch.checked_at)
        .bind(armed_sent || claimed)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Append-only: history rows are never updated or deleted.
        sqlx::query(
            "INSERT INTO flight_status_history (flight_id, status, recorded_at) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(patch.status.as_str())
        .bind(patch.checked_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(
            "Persisted status {} for flight {id} (claimed: {claimed})",
            patch.status
        );
        Ok(claimed)
    }

    async fn find_passengers_by_flight(
        &self,
        flight_id: Uuid,
    ) -> Result<Vec<Passenger>, StoreError> {
        let rows = sqlx::query_as::<_, PassengerRow>(
            r#"
            SELECT p.id, p.name, p.email, p.phone, p.category, p.archived
            FROM passengers p
            JOIN passenger_flights pf ON pf.passenger_id = p.id
            WHERE pf.flight_id = $1
            ORDER BY p.name ASC
            "#,
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Passenger::from).collect())
    }

    async fn status_history(&self, flight_id: Uuid) -> Result<Vec<StatusChange>, StoreError> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM flights WHERE id = $1")
            .bind(flight_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StoreError::FlightNotFound(flight_id));
        }

        let rows = sqlx::query_as::<_, StatusChangeRow>(
            "SELECT status, recorded_at FROM flight_status_history WHERE flight_id = $1 ORDER BY seq ASC",
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StatusChange::from).collect())
    }

    async fn archive_flights_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(sqlx::query(
            "UPDATE flights SET archived = TRUE, updated_at = NOW() WHERE scheduled_departure < $1 AND archived = FALSE",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?
        .rows_affected())
    }

    async fn archive_orphaned_passengers(&self) -> Result<u64, StoreError> {
        Ok(sqlx::query(
            r#"
            UPDATE passengers p
            SET archived = TRUE, updated_at = NOW()
            WHERE p.archived = FALSE
              AND NOT EXISTS (
                  SELECT 1
                  FROM passenger_flights pf
                  JOIN flights f ON f.id = pf.flight_id
                  WHERE pf.passenger_id = p.id AND f.archived = FALSE
              )
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
