//! Periodic job scheduler.
//!
//! Background work (health probes, replication pushes) runs as named
//! periodic jobs rather than ad hoc repeating callbacks. Each job gets:
//!
//! * a fixed-interval ticker,
//! * per-job mutual exclusion: if a run overruns its interval, the next
//!   tick is skipped instead of starting a second concurrent run,
//! * cooperative cancellation: [`Scheduler::shutdown`] signals every job
//!   loop and waits for in-flight runs to drain.
//!
//! Job failures are the job's own business; the closure returns `()` and is
//! expected to log its errors, matching the swallow-and-log contract of the
//! replication engine and health monitor.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, info, info_span};

/// Errors that can occur during scheduler operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A job was registered after shutdown began.
    #[error("Scheduler is shut down")]
    ShutDown,
}

/// Owns the background job loops of a node.
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Register a named periodic job.
    ///
    /// `task` is invoked once per `period`. The first invocation happens one
    /// full period after registration, not immediately. Runs of the same job
    /// never overlap: a tick that fires while the previous run is still in
    /// progress is skipped and logged at debug.
    pub fn spawn_periodic<F, Fut>(
        &self,
        name: &'static str,
        period: Duration,
        task: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if *self.shutdown_tx.borrow() {
            return Err(SchedulerError::ShutDown);
        }

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let run_lock = Arc::new(tokio::sync::Mutex::new(()));

        let handle = tokio::spawn(
            async move {
                info!(period_secs = period.as_secs(), "Starting periodic job");
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // Skip the immediate first tick.
                ticker.tick().await;

                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            match run_lock.clone().try_lock_owned() {
                                Ok(guard) => {
                                    let fut = task();
                                    tokio::spawn(async move {
                                        fut.await;
                                        drop(guard);
                                    });
                                }
                                Err(_) => {
                                    debug!("Previous run still in progress; skipping cycle");
                                }
                            }
                        }
                        _ = shutdown_rx.changed() => {
                            break;
                        }
                    }
                }

                // Wait for any in-flight run before reporting this job done.
                let _ = run_lock.lock().await;
                info!("Periodic job stopped");
            }
            .instrument(info_span!("periodic_job", job = name)),
        );

        self.handles.lock().unwrap().push(handle);
        Ok(())
    }

    /// Signal every job loop to stop and wait for them to drain.
    pub async fn shutdown(&self) {
        // send_replace stores the value even when no job is subscribed yet.
        self.shutdown_tx.send_replace(true);
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock().unwrap());
        for handle in handles {
            let _ = handle.await;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
