//! Periodic cycle reset job
//!
//! Sweeps all markets on a fixed interval and resets the due ones until the
//! shutdown signal flips to `true` (or its sender is dropped).

use std::time::Duration;

use market_common::JobConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::services::{CycleService, ResetReport, ServiceContext, ServiceResult};

/// Background job driving [`CycleService::reset_all_due`]
#[derive(Debug, Clone)]
pub struct CycleResetJob {
    ctx: ServiceContext,
    period: Duration,
}

impl CycleResetJob {
    pub fn new(ctx: ServiceContext, period: Duration) -> Self {
        Self {
            ctx,
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(ctx: ServiceContext, config: &JobConfig) -> Self {
        Self::new(ctx, Duration::from_secs(config.reset_interval_secs))
    }

    /// One sweep at the clock's current time
    pub async fn run_once(&self) -> ServiceResult<ResetReport> {
        let run_id = Uuid::new_v4();
        let now = self.ctx.clock().now();
        CycleService::new(&self.ctx)
            .reset_all_due(now)
            .instrument(info_span!("cycle_reset_run", %run_id))
            .await
    }

    /// Tick until shutdown. The first sweep runs immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = self.period.as_secs(), "Cycle reset job started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "Cycle reset sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Cycle reset job stopped");
    }

    /// Run on the current tokio runtime
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
