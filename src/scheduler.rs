//! Scheduler loop: runs one batch immediately, then one per interval tick,
//! until the shutdown future completes. A new batch never starts while the
//! previous one is still running; the loop is strictly sequential.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{error, info};

use crate::batch::run_batch;
use crate::config::Config;
use crate::convert::Convert;
use crate::remote::Remote;

/// Timer abstraction so interval behaviour is testable without real sleeps.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Ticker: Send {
    /// Completes when the next batch is due.
    async fn tick(&mut self);
}

/// Wall-clock ticker: the first tick fires one full period after creation,
/// so the startup batch is not immediately followed by a second one.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Totals over the life of the scheduler loop.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub batches: usize,
    pub failures: usize,
}

/// Drives batches until `shutdown` completes. Batch errors are logged and
/// absorbed; only process shutdown ends the loop.
pub async fn run_loop<R, C, T>(
    config: &Config,
    remote: &R,
    converter: &C,
    ticker: &mut T,
    shutdown: impl Future<Output = ()>,
) -> SchedulerStats
where
    R: Remote + ?Sized,
    C: Convert + ?Sized,
    T: Ticker + ?Sized,
{
    let mut stats = SchedulerStats::default();
    tokio::pin!(shutdown);

    loop {
        match run_batch(config, remote, converter).await {
            Ok(report) => match serde_json::to_string_pretty(&report) {
                Ok(json) => info!(report = %json, "Batch report"),
                Err(e) => error!(error = ?e, "Failed to serialise batch report"),
            },
            Err(e) => {
                stats.failures += 1;
                error!(error = %e, "Batch aborted, retrying on next interval");
            }
        }
        stats.batches += 1;

        tokio::select! {
            _ = &mut shutdown => {
                info!(batches = stats.batches, "Shutdown requested, stopping scheduler");
                break;
            }
            _ = ticker.tick() => {}
        }
    }

    stats
}
