//! Periodic expiry sweeps for a notification store

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::store::NotificationStore;

/// Owns a running cleanup task. Stopping (or dropping) the handle ends it.
pub struct CleanupHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CleanupHandle {
    /// Signal the task to stop; safe to call more than once
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Stop and wait for the task to finish
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl NotificationStore {
    /// Sweep expired notifications every `period` on the current tokio runtime.
    ///
    /// The first sweep happens one period after starting. Late ticks are
    /// skipped rather than bunched up. Fails outside a runtime or for a zero
    /// period.
    pub fn start_cleanup(&self, period: Duration) -> Result<CleanupHandle> {
        if period.is_zero() {
            return Err(Error::Config(
                "Cleanup interval must be greater than zero".to_string(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Runtime(format!("Cannot start notification cleanup: {}", e)))?;

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let store = self.clone();

        info!(period_secs = period.as_secs_f64(), "Starting notification cleanup");

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let removed = store.cleanup_expired();
                        debug!(removed, "Notification cleanup tick");
                    }
                }
            }

            info!("Notification cleanup stopped");
        });

        Ok(CleanupHandle {
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }
}
