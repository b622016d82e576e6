//! Reconciliation Scheduler
//!
//! Owns the single background task that drives reconciliation passes.
//!
//! ## Timing
//!
//! Fixed delay, not fixed rate: the next pass is scheduled one poll interval
//! after the previous pass *completes*, so passes never overlap even when
//! one runs long. The first pass fires after a warm-up delay, letting
//! cluster membership stabilize after controller start.
//!
//! ## Lifecycle
//!
//! `start()` spawns the loop; `stop()` signals it to decline future runs and
//! awaits task termination. An in-flight pass is never interrupted; awaiting
//! `stop()` is the drain.
//!
//! ## Example
//!
//! ```ignore
//! use tablewarden_controller::{ControllerConfig, Reconciler, ReconciliationScheduler};
//!
//! let scheduler = ReconciliationScheduler::new(reconciler, ControllerConfig::default());
//! scheduler.start().await?;
//!
//! // ... shutdown ...
//! scheduler.stop().await?;
//! ```

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::dispatcher::Reconciler;
use crate::error::{ControllerError, Result};

/// Periodic driver for [`Reconciler::run_pass`].
pub struct ReconciliationScheduler {
    reconciler: Arc<Reconciler>,
    config: ControllerConfig,
    handle: RwLock<Option<JoinHandle<()>>>,
    shutdown: RwLock<Option<watch::Sender<bool>>>,
}

impl ReconciliationScheduler {
    pub fn new(reconciler: Reconciler, config: ControllerConfig) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
            config,
            handle: RwLock::new(None),
            shutdown: RwLock::new(None),
        }
    }

    /// Start the periodic reconciliation loop.
    pub async fn start(&self) -> Result<()> {
        let mut handle_guard = self.handle.write().await;
        if handle_guard.is_some() {
            return Err(ControllerError::AlreadyStarted);
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let reconciler = Arc::clone(&self.reconciler);
        let initial_delay = self.config.initial_delay();
        let poll_interval = self.config.poll_interval();

        let handle = tokio::spawn(async move {
            info!(
                initial_delay_seconds = initial_delay.as_secs(),
                poll_interval_seconds = poll_interval.as_secs(),
                "Reconciliation scheduler started"
            );

            let mut delay = initial_delay;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }

                let started = Instant::now();
                reconciler.run_pass().await;
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Reconciliation pass returned"
                );

                // Fixed delay: measured from pass completion.
                delay = poll_interval;
            }

            info!("Reconciliation scheduler stopped");
        });

        *handle_guard = Some(handle);
        *self.shutdown.write().await = Some(shutdown_tx);

        Ok(())
    }

    /// Signal the loop to decline future runs and wait for it to finish.
    ///
    /// An in-flight pass runs to completion before this returns.
    pub async fn stop(&self) -> Result<()> {
        let shutdown_tx = self
            .shutdown
            .write()
            .await
            .take()
            .ok_or(ControllerError::NotStarted)?;
        // Receiver may already be gone if the task finished on its own.
        let _ = shutdown_tx.send(true);

        if let Some(handle) = self.handle.write().await.take() {
            handle.await?;
        }

        Ok(())
    }

    /// Whether the scheduling task is currently running.
    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
