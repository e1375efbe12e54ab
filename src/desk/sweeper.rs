//! Periodic escalation timeout sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::service::HelpDesk;

/// Default time between sweeps.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(10);

/// Default age after which a pending request is given up on.
pub const DEFAULT_PENDING_TIMEOUT: Duration = Duration::from_secs(120);

/// Timing for the sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweeperConfig {
    /// Time between sweeps.
    pub tick_interval: Duration,
    /// Pending requests older than this are marked unresolved.
    pub pending_timeout: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            pending_timeout: DEFAULT_PENDING_TIMEOUT,
        }
    }
}

/// Background task that forces stale pending requests into `Unresolved`.
#[derive(Debug, Clone)]
pub struct TimeoutSweeper {
    desk: Arc<HelpDesk>,
    config: SweeperConfig,
}

impl TimeoutSweeper {
    #[must_use]
    pub fn new(desk: Arc<HelpDesk>, config: SweeperConfig) -> Self {
        Self { desk, config }
    }

    #[must_use]
    pub fn config(&self) -> SweeperConfig {
        self.config
    }

    /// Run one sweep. Persistence failures are logged; the affected requests
    /// stay pending and are retried on the next tick.
    ///
    /// Returns the number of requests marked unresolved.
    pub async fn sweep(&self) -> usize {
        match self
            .desk
            .sweep_expired(Utc::now(), self.config.pending_timeout)
            .await
        {
            Ok(expired) => {
                if !expired.is_empty() {
                    tracing::info!(count = expired.len(), "Timed out pending requests");
                }
                expired.len()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sweep failed to persist, retrying next tick");
                0
            }
        }
    }

    /// Spawn the sweep loop. It stops issuing ticks once `cancel` fires; a
    /// sweep already in progress always runs to completion.
    #[must_use]
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            // `interval` panics on a zero period.
            let mut ticks = interval(self.config.tick_interval.max(Duration::from_millis(1)));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticks.tick().await;

            tracing::debug!(
                tick_secs = self.config.tick_interval.as_secs_f64(),
                timeout_secs = self.config.pending_timeout.as_secs_f64(),
                "Sweeper started"
            );

            loop {
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => {
                        tracing::info!("Sweeper shutting down");
                        break;
                    }

                    _ = ticks.tick() => {
                        self.sweep().await;
                    }
                }
            }
        })
    }
}
