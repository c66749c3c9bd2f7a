use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info};

use super::orchestrator::CycleRunner;

/// Fixed-rate background sweep over all registered services.
///
/// `start` spawns one recurring job firing at the configured period
/// (measured from registration, not from previous-run completion); the
/// first sweep comes one full period after `start`, not immediately. The loop
/// body runs cycles sequentially, so at most one cycle is ever in flight;
/// if a cycle overruns the period, the missed firing is skipped rather than
/// queued. `stop` only prevents future firings; an in-flight cycle always
/// runs to completion.
pub struct Scheduler {
    runner: Arc<CycleRunner>,
    sweep_interval: Duration,
    job: Option<(watch::Sender<bool>, JoinHandle<()>)>,
}

impl Scheduler {
    pub fn new(runner: Arc<CycleRunner>, sweep_interval: Duration) -> Self {
        Self { runner, sweep_interval, job: None }
    }

    pub fn is_running(&self) -> bool {
        self.job.is_some()
    }

    /// Start the recurring sweep. A no-op when already running.
    pub fn start(&mut self) {
        if self.job.is_some() {
            return;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let runner = self.runner.clone();
        let period = self.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                // Shutdown is only observed here, between cycles: a running
                // cycle is never cancelled mid-flight.
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = timer.tick() => {}
                }

                // A fault inside one firing must not stop future firings.
                if let Err(err) = runner.run_cycle(None).await {
                    error!(error = %err, "scheduled monitoring cycle failed");
                }
            }

            info!("monitoring scheduler stopped");
        });

        self.job = Some((stop_tx, handle));
        info!(period_seconds = period.as_secs(), "monitoring scheduler started");
    }

    /// Prevent future firings. The in-flight cycle, if any, finishes.
    pub fn stop(&mut self) {
        if let Some((stop_tx, _handle)) = self.job.take() {
            let _ = stop_tx.send(true);
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
