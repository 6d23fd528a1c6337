//! Scheduled pre-warm of every configured station.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::collector::Collector;
use crate::metrics::WARM_CYCLES_TOTAL;

/// Outcome of one warm cycle.
#[derive(Debug, Clone, Serialize)]
pub struct WarmSummary {
    pub run_id: Uuid,
    pub stations: usize,
    pub collected: usize,
    pub failed: Vec<String>,
    pub elapsed_ms: u64,
}

#[derive(Clone)]
pub struct CacheWarmer {
    collector: Arc<Collector>,
    interval: Duration,
    concurrency: usize,
}

impl CacheWarmer {
    pub fn new(collector: Arc<Collector>, interval: Duration, concurrency: usize) -> Self {
        Self {
            collector,
            interval,
            concurrency: concurrency.max(1),
        }
    }

    /// Collect every station once. `force` bypasses bucket hits.
    pub async fn run_cycle(&self, force: bool) -> WarmSummary {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let stations = self.collector.station_ids();
        info!(%run_id, stations = stations.len(), force, "Starting warm cycle");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(stations.len());

        for station in stations.iter().cloned() {
            let semaphore = semaphore.clone();
            let collector = self.collector.clone();
            handles.push((
                station.clone(),
                tokio::spawn(async move {
                    // the semaphore is never closed
                    let _permit = semaphore.acquire_owned().await.ok();
                    collector.collect(&station, force).await
                }),
            ));
        }

        let mut collected = 0;
        let mut failed = Vec::new();
        for (station, handle) in handles {
            match handle.await {
                Ok(Ok(_)) => collected += 1,
                Ok(Err(e)) => {
                    warn!(%run_id, station = %station, error = %e, "Warm collection failed");
                    failed.push(station);
                }
                Err(e) => {
                    warn!(%run_id, station = %station, error = %e, "Warm task panicked");
                    failed.push(station);
                }
            }
        }

        counter!(WARM_CYCLES_TOTAL).increment(1);
        let summary = WarmSummary {
            run_id,
            stations: stations.len(),
            collected,
            failed,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            %run_id,
            collected = summary.collected,
            failed = summary.failed.len(),
            elapsed_ms = summary.elapsed_ms,
            "Warm cycle complete"
        );
        summary
    }

    /// Run a cycle immediately and then every interval, until aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_cycle(false).await;
            }
        })
    }
}
