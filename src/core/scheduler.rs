//! Cron-based scheduler for periodic scan cycles

use cron::Schedule;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::ScanError;

/// Cron expression (with seconds) firing every `interval_seconds`.
///
/// Intervals of a minute or more round down to whole minutes, an hour or
/// more to whole hours.
pub fn cron_expression(interval_seconds: u64) -> Result<String, ScanError> {
    if interval_seconds == 0 {
        return Err(ScanError::config("scheduler interval must be > 0"));
    }
    // second minute hour day month weekday
    let expr = if interval_seconds >= 3600 {
        format!("0 0 */{} * * *", interval_seconds / 3600)
    } else if interval_seconds >= 60 {
        format!("0 */{} * * * *", interval_seconds / 60)
    } else {
        format!("*/{} * * * * *", interval_seconds)
    };
    Ok(expr)
}

/// Runs a scan cycle on every cron tick until stopped
pub struct ScanScheduler {
    schedule: Schedule,
    cron: String,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl ScanScheduler {
    pub fn new(interval_seconds: u64) -> Result<Self, ScanError> {
        let cron = cron_expression(interval_seconds)?;
        let schedule = Schedule::from_str(&cron).map_err(|e| {
            ScanError::config(format!("invalid cron expression '{}': {}", cron, e))
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron,
            "ScanScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron
        );

        Ok(Self {
            schedule,
            cron,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn cron(&self) -> &str {
        &self.cron
    }

    /// Spawns the tick loop. Each tick awaits `cycle` before sleeping again,
    /// so cycles never overlap.
    pub async fn start<F, Fut>(&self, cycle: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("ScanScheduler: started, waiting for cron schedule...");
            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                };
                let now = chrono::Utc::now();
                if next_tick > now {
                    let wait = (next_tick - now).to_std().unwrap_or_default();
                    tokio::time::sleep(wait).await;
                }

                debug!(tick = %next_tick, "ScanScheduler: cron tick");
                cycle().await;
            }
        });

        let mut current = self.handle.write().await;
        if let Some(previous) = current.replace(handle) {
            previous.abort();
        }
        info!("ScanScheduler: started successfully");
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("ScanScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
