//! Poll scheduler: one tick of the status-tracking pipeline.
//!
//! Flow per tick: select active flights → partition by airline → per
//! partition, sequentially: cache check → fetch → map → detect transition →
//! persist status and claim flag together → notify.
//!
//! Partitions run concurrently; inside one, external calls are spaced by
//! `inter_call_delay`. A flight that fails is logged and counted, never
//! allowed to abort the tick. Ticks never overlap: one that starts while
//! another is still running is skipped.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::models::Flight;
use crate::notify::Notifier;
use crate::store::{ActiveFlightFilter, FlightStore, StatusPatch, StoreError};
use crate::tracking::cache_policy::is_due;
use crate::tracking::fetcher::StatusFetcher;
use crate::tracking::transition::{should_notify, RearmPolicy};

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Minimum spacing between provider calls within one airline partition.
    pub inter_call_delay: std::time::Duration,
    /// How far back a scheduled departure may lie and still be polled.
    pub lookback: chrono::Duration,
    pub rearm: RearmPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            inter_call_delay: std::time::Duration::from_millis(500),
            lookback: chrono::Duration::hours(24),
            rearm: RearmPolicy::Never,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub selected: usize,
    pub partitions: usize,
    /// Skipped because their cached status is still fresh.
    pub fresh: usize,
    pub fetched: usize,
    pub fetch_failures: usize,
    pub updated: usize,
    pub notified: usize,
    pub errors: usize,
}

impl TickReport {
    fn merge(&mut self, other: TickReport) {
        self.fresh += other.fresh;
        self.fetched += other.fetched;
        self.fetch_failures += other.fetch_failures;
        self.updated += other.updated;
        self.notified += other.notified;
        self.errors += other.errors;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    Completed(TickReport),
    /// Another tick held the guard.
    Skipped,
    /// The batch query itself failed; nothing was processed.
    Aborted { reason: String },
}

enum FlightCheck {
    FetchFailed,
    Updated { notified: bool },
}

/// Per-flight work shared by all partition tasks of a tick.
struct FlightPipeline {
    store: Arc<dyn FlightStore>,
    fetcher: Arc<StatusFetcher>,
    notifier: Arc<Notifier>,
    rearm: RearmPolicy,
}

impl FlightPipeline {
    async fn run_partition(
        &self,
        airline: String,
        flights: Vec<Flight>,
        spacing: std::time::Duration,
    ) -> TickReport {
        let mut report = TickReport::default();
        let mut last_call: Option<Instant> = None;

        for flight in flights {
            if !is_due(&flight, Utc::now()) {
                report.fresh += 1;
                continue;
            }

            if let Some(at) = last_call {
                tokio::time::sleep_until(at + spacing).await;
            }
            last_call = Some(Instant::now());
            report.fetched += 1;

            match self.check_flight(&flight).await {
                Ok(FlightCheck::FetchFailed) => report.fetch_failures += 1,
                Ok(FlightCheck::Updated { notified }) => {
                    report.updated += 1;
                    if notified {
                        report.notified += 1;
                    }
                }
                Err(e) => {
                    error!(
                        "Status check for flight {} ({airline}) failed: {e}",
                        flight.flight_number
                    );
                    report.errors += 1;
                }
            }
        }

        debug!(
            "Partition {airline}: fetched={} fresh={} failures={}",
            report.fetched, report.fresh, report.fetch_failures
        );
        report
    }

    async fn check_flight(&self, flight: &Flight) -> Result<FlightCheck, TrackError> {
        let snapshot = match self.fetcher.fetch(flight).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // last_checked is left alone so the flight is retried next tick.
                warn!(
                    "Error checking status for flight {}: {e}",
                    flight.flight_number
                );
                return Ok(FlightCheck::FetchFailed);
            }
        };

        let prev = flight.status;
        let new = snapshot.status;
        let rearm = flight.notification_sent && self.rearm.should_rearm(prev, new);
        let notify = should_notify(prev, new);
        // Status, history entry and notification claim commit in one write.
        let wants_claim = notify && !flight.notification_sent;
        let patch = StatusPatch {
            status: new,
            delay_minutes: snapshot.delay_minutes,
            checked_at: snapshot.fetched_at,
            rearm_notification: rearm,
            claim_notification: wants_claim,
        };
        let claimed = self.store.update_flight_status(flight.id, &patch).await?;

        if prev != new {
            info!(
                "Flight {} status {prev} -> {new} (provider: {:?})",
                flight.flight_number, snapshot.raw_status
            );
        }
        if rearm {
            info!(
                "Flight {} recovered; notification re-armed",
                flight.flight_number
            );
        }

        let mut updated = flight.clone();
        updated.status = new;
        updated.delay_minutes = snapshot.delay_minutes;
        updated.last_checked = Some(snapshot.fetched_at);
        updated.notification_sent = (flight.notification_sent && !rearm) || claimed;

        if !notify {
            return Ok(FlightCheck::Updated { notified: false });
        }
        if !wants_claim {
            debug!(
                "Flight {} already notified this episode",
                flight.flight_number
            );
            return Ok(FlightCheck::Updated { notified: false });
        }
        if !claimed {
            debug!(
                "Notification for flight {} claimed by another writer",
                flight.flight_number
            );
            return Ok(FlightCheck::Updated { notified: false });
        }

        let passengers = match self.store.find_passengers_by_flight(flight.id).await {
            Ok(passengers) => passengers,
            Err(e) => {
                warn!(
                    "Could not load passengers for flight {}: {e}; notifying admin only",
                    flight.flight_number
                );
                Vec::new()
            }
        };

        let outcome = self.notifier.notify(&updated, &passengers).await;
        if outcome.success {
            info!(
                "Notified {} for flight {} via {}",
                new,
                flight.flight_number,
                outcome.method.as_str()
            );
        } else {
            warn!(
                "Notification for flight {} not delivered ({}): {}",
                flight.flight_number,
                outcome.method.as_str(),
                outcome.detail
            );
        }

        Ok(FlightCheck::Updated { notified: true })
    }
}

pub struct PollScheduler {
    pipeline: Arc<FlightPipeline>,
    config: PollConfig,
    running: Mutex<()>,
}

impl PollScheduler {
    pub fn new(
        store: Arc<dyn FlightStore>,
        fetcher: Arc<StatusFetcher>,
        notifier: Arc<Notifier>,
        config: PollConfig,
    ) -> Self {
        Self {
            pipeline: Arc::new(FlightPipeline {
                store,
                fetcher,
                notifier,
                rearm: config.rearm,
            }),
            config,
            running: Mutex::new(()),
        }
    }

    /// Runs one tick now. Returns `Skipped` if a tick is already in flight.
    pub async fn tick(&self) -> TickOutcome {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("Previous flight status tick still running; skipping");
            return TickOutcome::Skipped;
        };

        let filter = ActiveFlightFilter {
            departing_after: Utc::now() - self.config.lookback,
        };
        let flights = match self.pipeline.store.find_active_flights(filter).await {
            Ok(flights) => flights,
            Err(e) => {
                error!("Error selecting active flights: {e}");
                return TickOutcome::Aborted {
                    reason: e.to_string(),
                };
            }
        };

        let mut report = TickReport {
            selected: flights.len(),
            ..TickReport::default()
        };
        info!("Checking status for {} active flights", flights.len());

        let partitions = partition_by_airline(flights);
        report.partitions = partitions.len();

        let mut tasks = JoinSet::new();
        for (airline, flights) in partitions {
            let pipeline = Arc::clone(&self.pipeline);
            let spacing = self.config.inter_call_delay;
            tasks.spawn(async move { pipeline.run_partition(airline, flights, spacing).await });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(partition) => report.merge(partition),
                Err(e) => {
                    error!("Partition task failed: {e}");
                    report.errors += 1;
                }
            }
        }

        info!(
            "Status tick done: selected={} fetched={} updated={} notified={} fetch_failures={} errors={}",
            report.selected,
            report.fetched,
            report.updated,
            report.notified,
            report.fetch_failures,
            report.errors
        );
        TickOutcome::Completed(report)
    }
}

/// Groups flights into per-airline rate-limit buckets. Terminal flights are
/// dropped here as well as in the store query.
fn partition_by_airline(flights: Vec<Flight>) -> BTreeMap<String, Vec<Flight>> {
    let mut partitions: BTreeMap<String, Vec<Flight>> = BTreeMap::new();
    for flight in flights.into_iter().filter(|f| !f.status.is_terminal()) {
        partitions
            .entry(flight.airline.clone())
            .or_default()
            .push(flight);
    }
    partitions
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use tokio::sync::{Barrier, Notify};

    use super::*;
    use crate::models::FlightStatus;
    use crate::notify::history::NotificationRecord;
    use crate::notify::settings::NotificationSettings;
    use crate::notify::testing::{MemorySettingsStore, RecordingTransport};
    use crate::notify::transport::DeliveryMethod;
    use crate::notify::Transports;
    use crate::store::memory::{flight_fixture, passenger_fixture, MemoryStore};
    use crate::tracking::fetcher::testing::{reported, ScriptedProvider};
    use crate::tracking::provider::{FetchFailure, FlightStatusProvider, ProviderFlight};
    use crate::tracking::status_map::StatusMapper;

    struct Harness {
        store: Arc<MemoryStore>,
        provider: Arc<ScriptedProvider>,
        notifier: Arc<Notifier>,
        scheduler: PollScheduler,
    }

    fn harness_with(settings: NotificationSettings, rearm: RearmPolicy) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(ScriptedProvider::new());
        let notifier = Arc::new(Notifier::new(
            settings,
            Arc::new(MemorySettingsStore::default()),
            Transports {
                email: Arc::new(RecordingTransport::new(DeliveryMethod::Email)),
                sms: Arc::new(RecordingTransport::new(DeliveryMethod::Sms)),
                log: Arc::new(RecordingTransport::new(DeliveryMethod::Log)),
            },
        ));
        let fetcher = Arc::new(StatusFetcher::new(
            provider.clone(),
            StatusMapper::default(),
        ));
        let scheduler = PollScheduler::new(
            store.clone(),
            fetcher,
            notifier.clone(),
            PollConfig {
                inter_call_delay: std::time::Duration::ZERO,
                rearm,
                ..PollConfig::default()
            },
        );
        Harness {
            store,
            provider,
            notifier,
            scheduler,
        }
    }

    fn harness() -> Harness {
        harness_with(
            NotificationSettings {
                admin_email: "ops@example.com".to_string(),
                ..NotificationSettings::default()
            },
            RearmPolicy::Never,
        )
    }

    fn completed(outcome: TickOutcome) -> TickReport {
        match outcome {
            TickOutcome::Completed(report) => report,
            other => panic!("expected completed tick, got {other:?}"),
        }
    }

    fn admin_records(notifier: &Notifier) -> Vec<NotificationRecord> {
        notifier
            .history()
            .into_iter()
            .filter(|r| r.subject.starts_with("Flight "))
            .collect()
    }

    #[tokio::test]
    async fn test_delay_end_to_end() {
        let h = harness();
        let flight = flight_fixture("AB123", "Acme Air", 1);
        let id = flight.id;
        h.store.insert_flight(flight.clone());
        h.store
            .insert_passenger(passenger_fixture("Ada"), vec![id]);
        h.provider.respond(
            "AB123",
            reported(
                "delayed",
                Some(flight.scheduled_departure),
                Some(flight.scheduled_departure + Duration::minutes(40)),
            ),
        );

        let report = completed(h.scheduler.tick().await);
        assert_eq!(report.selected, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.notified, 1);

        let stored = h.store.flight(id);
        assert_eq!(stored.status, FlightStatus::Delayed);
        assert_eq!(stored.delay_minutes, 40);
        assert!(stored.notification_sent);
        assert!(stored.last_checked.is_some());
        assert_eq!(h.store.history_len(id), 2);

        let records = admin_records(&h.notifier);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, DeliveryMethod::Email);
        assert_eq!(records[0].recipient, "ops@example.com");
        assert!(records[0].body.contains("with 1 passengers"));

        // Same provider data on a later tick: no new notification.
        h.store.age_last_checked(id, Duration::minutes(10));
        let report = completed(h.scheduler.tick().await);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.notified, 0);
        assert_eq!(admin_records(&h.notifier).len(), 1);
        assert_eq!(h.provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_immediate_second_tick_is_served_from_cache() {
        let h = harness();
        let mut flight = flight_fixture("AB123", "Acme Air", 1);
        flight.status = FlightStatus::Delayed;
        flight.notification_sent = true;
        h.store.insert_flight(flight);
        h.provider
            .respond("AB123", reported("Delayed", None, None));

        let first = completed(h.scheduler.tick().await);
        let second = completed(h.scheduler.tick().await);

        assert_eq!(first.notified + second.notified, 0);
        assert_eq!(second.fresh, 1);
        assert!(h.notifier.history().is_empty());
        assert_eq!(h.provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_already_notified_flight_does_not_renotify_on_cancellation() {
        let h = harness();
        let mut flight = flight_fixture("AB123", "Acme Air", 1);
        flight.status = FlightStatus::Delayed;
        flight.notification_sent = true;
        let id = flight.id;
        h.store.insert_flight(flight);
        h.provider
            .respond("AB123", reported("Cancelled", None, None));

        let report = completed(h.scheduler.tick().await);

        assert_eq!(report.notified, 0);
        assert_eq!(h.store.flight(id).status, FlightStatus::Cancelled);
        assert!(h.notifier.history().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_flights_never_fetched() {
        let h = harness();
        for (number, status) in [("LN1", FlightStatus::Landed), ("CX1", FlightStatus::Cancelled)] {
            let mut flight = flight_fixture(number, "Acme Air", 1);
            flight.status = status;
            flight.last_checked = Some(Utc::now() - Duration::days(3));
            h.store.insert_flight(flight);
            h.provider.respond(number, reported("Delayed", None, None));
        }

        let report = completed(h.scheduler.tick().await);

        assert_eq!(report.selected, 0);
        assert!(h.provider.calls().is_empty());
    }

    #[test]
    fn test_partition_drops_terminal_flights() {
        let mut landed = flight_fixture("LN1", "Acme Air", 1);
        landed.status = FlightStatus::Landed;
        let partitions = partition_by_airline(vec![
            landed,
            flight_fixture("AB1", "Acme Air", 1),
            flight_fixture("ZZ1", "Zed Air", 1),
            flight_fixture("AB2", "Acme Air", 2),
        ]);

        assert_eq!(partitions.len(), 2);
        let acme: Vec<_> = partitions["Acme Air"]
            .iter()
            .map(|f| f.flight_number.as_str())
            .collect();
        assert_eq!(acme, vec!["AB1", "AB2"]);
        assert_eq!(partitions["Zed Air"].len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_last_checked_and_continues_batch() {
        let h = harness();
        let broken = flight_fixture("BR1", "Acme Air", 1);
        let healthy = flight_fixture("OK1", "Acme Air", 2);
        let (broken_id, healthy_id) = (broken.id, healthy.id);
        h.store.insert_flight(broken);
        h.store.insert_flight(healthy);
        h.provider.fail("BR1");
        h.provider.respond("OK1", reported("Active", None, None));

        let report = completed(h.scheduler.tick().await);

        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.updated, 1);
        assert!(h.store.flight(broken_id).last_checked.is_none());
        assert_eq!(h.store.history_len(broken_id), 1);
        assert_eq!(h.store.flight(healthy_id).status, FlightStatus::InAir);

        // Still eligible on the very next tick.
        let report = completed(h.scheduler.tick().await);
        assert_eq!(report.fetch_failures, 1);
        assert_eq!(report.fresh, 1);
    }

    #[tokio::test]
    async fn test_failed_status_write_keeps_delay_notifiable() {
        let h = harness();
        let flight = flight_fixture("AB123", "Acme Air", 1);
        let id = flight.id;
        h.store.insert_flight(flight);
        h.provider
            .respond("AB123", reported("Delayed", None, None));

        h.store.set_fail_updates(true);
        let report = completed(h.scheduler.tick().await);
        assert_eq!(report.errors, 1);
        assert_eq!(report.notified, 0);
        let stored = h.store.flight(id);
        assert_eq!(stored.status, FlightStatus::Scheduled);
        assert!(!stored.notification_sent);
        assert!(stored.last_checked.is_none());
        assert_eq!(h.store.history_len(id), 1);

        h.store.set_fail_updates(false);
        let report = completed(h.scheduler.tick().await);
        assert_eq!(report.notified, 1);
        let stored = h.store.flight(id);
        assert_eq!(stored.status, FlightStatus::Delayed);
        assert!(stored.notification_sent);
        assert_eq!(h.store.history_len(id), 2);
        assert_eq!(admin_records(&h.notifier).len(), 1);

        h.store.age_last_checked(id, Duration::minutes(10));
        let report = completed(h.scheduler.tick().await);
        assert_eq!(report.notified, 0);
        assert_eq!(admin_records(&h.notifier).len(), 1);
    }

    /// Provider that holds each lookup until the barrier fills.
    struct RendezvousProvider {
        barrier: Barrier,
        answer: ProviderFlight,
    }

    #[async_trait]
    impl FlightStatusProvider for RendezvousProvider {
        async fn lookup(
            &self,
            _flight_number: &str,
            _date: NaiveDate,
        ) -> Result<ProviderFlight, FetchFailure> {
            self.barrier.wait().await;
            Ok(self.answer.clone())
        }
    }

    #[tokio::test]
    async fn test_concurrent_schedulers_notify_once() {
        let store = Arc::new(MemoryStore::new());
        let flight = flight_fixture("AB123", "Acme Air", 1);
        let id = flight.id;
        store.insert_flight(flight);

        let provider = Arc::new(RendezvousProvider {
            barrier: Barrier::new(2),
            answer: reported("Delayed", None, None),
        });
        let notifier = Arc::new(Notifier::new(
            NotificationSettings {
                admin_email: "ops@example.com".to_string(),
                ..NotificationSettings::default()
            },
            Arc::new(MemorySettingsStore::default()),
            Transports {
                email: Arc::new(RecordingTransport::new(DeliveryMethod::Email)),
                sms: Arc::new(RecordingTransport::new(DeliveryMethod::Sms)),
                log: Arc::new(RecordingTransport::new(DeliveryMethod::Log)),
            },
        ));
        let scheduler = || {
            PollScheduler::new(
                store.clone(),
                Arc::new(StatusFetcher::new(provider.clone(), StatusMapper::default())),
                notifier.clone(),
                PollConfig::default(),
            )
        };
        let (first, second) = (scheduler(), scheduler());

        // Both select the flight before either writes, so both see it unclaimed.
        let (a, b) = tokio::join!(first.tick(), second.tick());
        let (a, b) = (completed(a), completed(b));

        assert_eq!(a.updated + b.updated, 2);
        assert_eq!(a.notified + b.notified, 1);
        assert_eq!(admin_records(&notifier).len(), 1);
        assert!(store.flight(id).notification_sent);
        assert_eq!(store.history_len(id), 3);
    }

    #[tokio::test]
    async fn test_lookback_window_excludes_old_departures() {
        let h = harness();
        h.store.insert_flight(flight_fixture("OLD1", "Acme Air", -30));
        h.store.insert_flight(flight_fixture("NEW1", "Acme Air", -2));
        h.provider.respond("NEW1", reported("Active", None, None));
        h.provider.respond("OLD1", reported("Active", None, None));

        let report = completed(h.scheduler.tick().await);

        assert_eq!(report.selected, 1);
        assert_eq!(h.provider.calls(), vec!["NEW1".to_string()]);
    }

    #[tokio::test]
    async fn test_rearm_on_recovery_notifies_second_episode() {
        let h = harness_with(
            NotificationSettings {
                admin_email: "ops@example.com".to_string(),
                ..NotificationSettings::default()
            },
            RearmPolicy::OnRecovery,
        );
        let flight = flight_fixture("AB123", "Acme Air", 1);
        let id = flight.id;
        h.store.insert_flight(flight);

        for status in ["Delayed", "Scheduled", "Delayed"] {
            h.provider.respond("AB123", reported(status, None, None));
            completed(h.scheduler.tick().await);
            h.store.age_last_checked(id, Duration::minutes(10));
        }

        assert_eq!(admin_records(&h.notifier).len(), 2);
        assert!(h.store.flight(id).notification_sent);
        assert_eq!(h.store.history_len(id), 4);
    }

    #[tokio::test]
    async fn test_default_policy_notifies_once_per_flight() {
        let h = harness();
        let flight = flight_fixture("AB123", "Acme Air", 1);
        let id = flight.id;
        h.store.insert_flight(flight);

        for status in ["Delayed", "Scheduled", "Delayed"] {
            h.provider.respond("AB123", reported(status, None, None));
            completed(h.scheduler.tick().await);
            h.store.age_last_checked(id, Duration::minutes(10));
        }

        assert_eq!(admin_records(&h.notifier).len(), 1);
    }

    /// Provider that parks every lookup until released.
    struct GatedProvider {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl FlightStatusProvider for GatedProvider {
        async fn lookup(
            &self,
            _flight_number: &str,
            _date: NaiveDate,
        ) -> Result<ProviderFlight, FetchFailure> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(ProviderFlight::default())
        }
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        store.insert_flight(flight_fixture("AB123", "Acme Air", 1));
        let provider = Arc::new(GatedProvider {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let notifier = Arc::new(Notifier::new(
            NotificationSettings::default(),
            Arc::new(MemorySettingsStore::default()),
            Transports {
                email: Arc::new(RecordingTransport::new(DeliveryMethod::Email)),
                sms: Arc::new(RecordingTransport::new(DeliveryMethod::Sms)),
                log: Arc::new(RecordingTransport::new(DeliveryMethod::Log)),
            },
        ));
        let scheduler = Arc::new(PollScheduler::new(
            store,
            Arc::new(StatusFetcher::new(provider.clone(), StatusMapper::default())),
            notifier,
            PollConfig::default(),
        ));

        let first = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.tick().await }
        });
        provider.entered.notified().await;

        assert_eq!(scheduler.tick().await, TickOutcome::Skipped);

        provider.release.notify_one();
        let report = completed(first.await.unwrap());
        assert_eq!(report.updated, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_within_partition_are_spaced() {
        let store = Arc::new(MemoryStore::new());
        for n in 0..3 {
            store.insert_flight(flight_fixture(&format!("AB{n}"), "Acme Air", 1 + n));
        }
        let provider = Arc::new(ScriptedProvider::new());
        for n in 0..3 {
            provider.respond(&format!("AB{n}"), reported("Active", None, None));
        }
        let scheduler = PollScheduler::new(
            store,
            Arc::new(StatusFetcher::new(provider.clone(), StatusMapper::default())),
            Arc::new(Notifier::new(
                NotificationSettings::default(),
                Arc::new(MemorySettingsStore::default()),
                Transports {
                    email: Arc::new(RecordingTransport::new(DeliveryMethod::Email)),
                    sms: Arc::new(RecordingTransport::new(DeliveryMethod::Sms)),
                    log: Arc::new(RecordingTransport::new(DeliveryMethod::Log)),
                },
            )),
            PollConfig::default(),
        );

        let started = Instant::now();
        let report = completed(scheduler.tick().await);

        assert_eq!(report.fetched, 3);
        assert!(started.elapsed() >= std::time::Duration::from_millis(1000));
    }
}
