//! Background reconciliation for abandoned jobs.
//!
//! Callers that stop polling (closed tab, crashed client) leave
//! non-terminal records behind while the remote job keeps running. This
//! sweep polls every non-terminal job on an interval so those records
//! still settle into their terminal state.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info, warn};

use arthur_store::JobStore;

use crate::tracker::AsyncJobTracker;

/// Interval between reconciliation sweeps when not configured.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic sweep that drives non-terminal jobs toward settlement.
pub struct Reconciler {
    tracker: Arc<AsyncJobTracker>,
    store: Arc<dyn JobStore>,
    sweep_interval: Duration,
    enabled: bool,
}

impl Reconciler {
    /// Create a new reconciler, reading its toggles from the environment.
    pub fn new(tracker: Arc<AsyncJobTracker>, store: Arc<dyn JobStore>) -> Self {
        let enabled = std::env::var("ENABLE_RECONCILER")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let sweep_interval = std::env::var("RECONCILE_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SWEEP_INTERVAL);

        Self {
            tracker,
            store,
            sweep_interval,
            enabled,
        }
    }

    /// Run the sweep loop indefinitely. Spawn as a background task.
    pub async fn run(&self) {
        if !self.enabled {
            info!("Job reconciler is disabled");
            return;
        }

        info!("Starting job reconciler (interval: {:?})", self.sweep_interval);

        let mut ticker = interval(self.sweep_interval);

        loop {
            ticker.tick().await;

            if let Err(e) = self.sweep_once().await {
                error!("Reconciliation sweep error: {}", e);
            }
        }
    }

    /// Run a single sweep. Returns (jobs checked, jobs settled).
    pub async fn sweep_once(&self) -> anyhow::Result<(u32, u32)> {
        let jobs = self.store.list(None).await?;

        let mut checked = 0u32;
        let mut settled = 0u32;

        for job in jobs.into_iter().filter(|j| !j.is_terminal()) {
            checked += 1;

            match self.tracker.poll(&job.id).await {
                Ok(updated) if updated.is_terminal() => {
                    settled += 1;
                    info!(
                        job_id = %updated.id,
                        state = %updated.state,
                        "Reconciled abandoned job to terminal state"
                    );
                }
                Ok(_) => {}
                // A failed status query says nothing about the job;
                // leave it for the next sweep.
                Err(e) => {
                    warn!(job_id = %job.id, "Skipping job this sweep: {}", e);
                }
            }
        }

        if settled > 0 {
            info!("Reconciliation sweep complete: {} checked, {} settled", checked, settled);
        }

        Ok((checked, settled))
    }
}
