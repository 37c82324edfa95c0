use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Handle to a background job started by [`spawn_periodic`].
pub struct JobHandle {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// Signals the job to stop and waits for any in-progress run to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("{} job ended abnormally: {e}", self.name);
        }
    }
}

/// Runs `job` every `period` until stopped. Runs never overlap: a run that
/// overshoots the period causes the missed ticks to be skipped, not queued.
pub fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    run_immediately: bool,
    mut job: F,
) -> JobHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let (shutdown, mut stop) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !run_immediately {
            // The first tick of an interval completes immediately.
            ticker.tick().await;
        }
        info!("{name} job scheduled every {}s", period.as_secs());

        loop {
            tokio::select! {
                _ = ticker.tick() => job().await,
                _ = stop.changed() => break,
            }
        }
        info!("{name} job stopped");
    });

    JobHandle {
        name,
        shutdown,
        task,
    }
}
