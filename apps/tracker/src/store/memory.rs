use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Flight, FlightStatus, Passenger, PassengerCategory, StatusChange};
use crate::store::{ActiveFlightFilter, FlightStore, StatusPatch, StoreError};

#[derive(Default)]
struct Inner {
    flights: Vec<Flight>,
    history: HashMap<Uuid, Vec<StatusChange>>,
    passengers: Vec<(Passenger, Vec<Uuid>)>,
}

/// In-memory record store for pipeline tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_updates: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a flight and seeds its history with the initial status, the way
    /// ingestion does.
    pub fn insert_flight(&self, flight: Flight) {
        let mut inner = self.inner.lock().unwrap();
        inner.history.insert(
            flight.id,
            vec![StatusChange {
                status: flight.status,
                timestamp: Utc::now(),
            }],
        );
        inner.flights.push(flight);
    }

    pub fn insert_passenger(&self, passenger: Passenger, flight_ids: Vec<Uuid>) {
        self.inner
            .lock()
            .unwrap()
            .passengers
            .push((passenger, flight_ids));
    }

    pub fn flight(&self, id: Uuid) -> Flight {
        self.inner
            .lock()
            .unwrap()
            .flights
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .expect("flight exists")
    }

    pub fn passenger(&self, id: Uuid) -> Passenger {
        self.inner
            .lock()
            .unwrap()
            .passengers
            .iter()
            .find(|(p, _)| p.id == id)
            .map(|(p, _)| p.clone())
            .expect("passenger exists")
    }

    pub fn history_len(&self, id: Uuid) -> usize {
        self.inner
            .lock()
            .unwrap()
            .history
            .get(&id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Pushes `last_checked` back so the cache window has elapsed.
    pub fn age_last_checked(&self, id: Uuid, by: Duration) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(flight) = inner.flights.iter_mut().find(|f| f.id == id) {
            flight.last_checked = flight.last_checked.map(|t| t - by);
        }
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FlightStore for MemoryStore {
    async fn find_active_flights(
        &self,
        filter: ActiveFlightFilter,
    ) -> Result<Vec<Flight>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut flights: Vec<Flight> = inner
            .flights
            .iter()
            .filter(|f| {
                !f.status.is_terminal()
                    && !f.archived
                    && f.scheduled_departure >= filter.departing_after
            })
            .cloned()
            .collect();
        flights.sort_by_key(|f| f.scheduled_departure);
        Ok(flights)
    }

    async fn update_flight_status(
        &self,
        id: Uuid,
        patch: &StatusPatch,
    ) -> Result<bool, StoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut inner = self.inner.lock().unwrap();
        let flight = inner
            .flights
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(StoreError::FlightNotFound(id))?;
        flight.status = patch.status;
        flight.delay_minutes = patch.delay_minutes;
        flight.last_checked = Some(patch.checked_at);
        if patch.rearm_notification {
            flight.notification_sent = false;
        }
        let claimed = patch.claim_notification && !flight.notification_sent;
        if claimed {
            flight.notification_sent = true;
        }
        inner.history.entry(id).or_default().push(StatusChange {
            status: patch.status,
            timestamp: patch.checked_at,
        });
        Ok(claimed)
    }

    async fn find_passengers_by_flight(
        &self,
        flight_id: Uuid,
    ) -> Result<Vec<Passenger>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .passengers
            .iter()
            .filter(|(_, flights)| flights.contains(&flight_id))
            .map(|(p, _)| p.clone())
            .collect())
    }

    async fn status_history(&self, flight_id: Uuid) -> Result<Vec<StatusChange>, StoreError> {
        self.inner
            .lock()
            .unwrap()
            .history
            .get(&flight_id)
            .cloned()
            .ok_or(StoreError::FlightNotFound(flight_id))
    }

    async fn archive_flights_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut changed = 0;
        for flight in inner
            .flights
            .iter_mut()
            .filter(|f| !f.archived && f.scheduled_departure < cutoff)
        {
            flight.archived = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn archive_orphaned_passengers(&self) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Inner {
            flights,
            passengers,
            ..
        } = &mut *inner;
        let mut changed = 0;
        for (passenger, flight_ids) in passengers.iter_mut().filter(|(p, _)| !p.archived) {
            let has_active = flights
                .iter()
                .any(|f| !f.archived && flight_ids.contains(&f.id));
            if !has_active {
                passenger.archived = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Test fixture: a Scheduled flight departing `hours_from_now` hours from now.
pub fn flight_fixture(flight_number: &str, airline: &str, hours_from_now: i64) -> Flight {
    let departure = Utc::now() + Duration::hours(hours_from_now);
    Flight {
        id: Uuid::new_v4(),
        flight_number: flight_number.to_string(),
        airline: airline.to_string(),
        departure_airport: "JFK".to_string(),
        arrival_airport: "LAX".to_string(),
        scheduled_departure: departure,
        scheduled_arrival: departure + Duration::hours(6),
        status: FlightStatus::Scheduled,
        delay_minutes: 0,
        last_checked: None,
        notification_sent: false,
        archived: false,
    }
}

pub fn passenger_fixture(name: &str) -> Passenger {
    Passenger {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: Some("+15550100".to_string()),
        category: PassengerCategory::Regular,
        archived: false,
    }
}
