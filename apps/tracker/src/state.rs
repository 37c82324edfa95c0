use std::sync::Arc;

use crate::notify::Notifier;
use crate::store::FlightStore;
use crate::tracking::retention::RetentionSweeper;
use crate::tracking::scheduler::PollScheduler;

/// Shared application state injected into all route handlers via Axum extractors.
/// The background jobs hold clones of the same scheduler and sweeper, so a
/// manual run and a timer run share one overlap guard.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FlightStore>,
    pub scheduler: Arc<PollScheduler>,
    pub sweeper: Arc<RetentionSweeper>,
    pub notifier: Arc<Notifier>,
}
