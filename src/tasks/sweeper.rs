//! Expiration Sweeper Task
//!
//! Background task that periodically reclaims expired cache entries.
//!
//! Reads never depend on the sweeper: every lookup checks the entry's own
//! TTL. The sweeper only bounds how long expired entries keep their memory
//! and capacity.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::Result;

// == Sweep ==
/// Something that can drop its expired entries.
pub trait Sweep: Send + Sync + 'static {
    /// Removes expired entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

/// Shortest period the sweeper ticks at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

// == Sweeper Handle ==
/// Owner side of a running sweeper.
///
/// Dropping the handle also stops the task, without waiting for it.
#[derive(Debug)]
pub struct SweeperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task to stop after its current pass.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    // == Shutdown ==
    /// Stops the task and waits for it to exit.
    pub async fn shutdown(self) -> Result<()> {
        self.stop();
        self.task.await?;
        Ok(())
    }
}

/// Spawns a task on the current Tokio runtime that sweeps `target` every
/// `interval`.
///
/// The task holds only a weak reference: it exits on its own once the target
/// is dropped, as well as when the handle is stopped or dropped.
///
/// Each pass runs on Tokio's blocking pool, so a sweep waiting on a
/// synchronous lock never stalls the async workers. A zero `interval` is
/// raised to [`MIN_SWEEP_INTERVAL`].
///
/// # Panics
/// Panics if called outside of a Tokio runtime.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweeper(Arc::downgrade(&shared), Duration::from_secs(1));
/// // Later, during shutdown:
/// handle.shutdown().await?;
/// ```
pub fn spawn_sweeper<T: Sweep>(target: Weak<T>, interval: Duration) -> SweeperHandle {
    let (stop, mut stopped) = watch::channel(false);
    let interval = interval.max(MIN_SWEEP_INTERVAL);

    let task = tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiration sweeper");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                // Fires on stop() and when the handle is dropped
                _ = stopped.changed() => break,
            }

            let Some(target) = target.upgrade() else {
                debug!("Sweep target dropped");
                break;
            };
            let removed = match tokio::task::spawn_blocking(move || target.sweep()).await {
                Ok(removed) => removed,
                Err(e) => {
                    warn!(error = %e, "Expiration sweep failed");
                    break;
                }
            };

            if removed > 0 {
                info!(removed, "Expiration sweep removed expired entries");
            } else {
                debug!("Expiration sweep: no expired entries found");
            }
        }

        info!("Expiration sweeper stopped");
    });

    SweeperHandle { stop, task }
}
