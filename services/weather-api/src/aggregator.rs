//! Region aggregation with fixed arity.
//!
//! Every configured station gets a slot, in configured order, whatever
//! happens upstream. A failed collection falls back to the station's last
//! good reading, then to an explicit failure slot.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use metrics::counter;
use tracing::{info, instrument, warn};
use weather_common::{RegionResponse, SlotOutcome, StationSlot, WeatherResult};

use crate::collector::Collector;
use crate::config::StationCatalog;
use crate::metrics::{REGION_AGGREGATE_TOTAL, REGION_STATION_FAILURES_TOTAL};

pub struct Aggregator {
    catalog: Arc<StationCatalog>,
    collector: Arc<Collector>,
    ttl_secs: u64,
}

impl Aggregator {
    pub fn new(catalog: Arc<StationCatalog>, collector: Arc<Collector>) -> Self {
        let ttl_secs = collector.settings().reading_ttl.as_secs();
        Self {
            catalog,
            collector,
            ttl_secs,
        }
    }

    /// Collect every station of `region_id` concurrently.
    ///
    /// Fails only for an unknown region. One station failing never cancels
    /// or fails its siblings.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, region_id: &str, force: bool) -> WeatherResult<RegionResponse> {
        let region = self.catalog.region(region_id)?;

        let collections = region.stations.iter().map(|station| async move {
            let outcome = match self.collector.collect(station, force).await {
                Ok(reading) => SlotOutcome::Fresh(reading),
                Err(err) => match self.collector.stale(station).await {
                    Some(reading) => {
                        warn!(station = %station, error = %err, "Serving stale reading");
                        SlotOutcome::Stale(reading)
                    }
                    None => {
                        warn!(station = %station, error = %err, "No reading for slot");
                        SlotOutcome::Failed(err.to_string())
                    }
                },
            };
            StationSlot {
                station_id: station.clone(),
                name: self.catalog.station_name(station).to_string(),
                outcome,
            }
        });

        // join_all keeps input order regardless of completion order
        let stations = join_all(collections).await;

        let degraded = stations
            .iter()
            .filter(|s| !matches!(s.outcome, SlotOutcome::Fresh(_)))
            .count();
        counter!(REGION_AGGREGATE_TOTAL, "region" => region.id.clone()).increment(1);
        if degraded > 0 {
            counter!(REGION_STATION_FAILURES_TOTAL, "region" => region.id.clone())
                .increment(degraded as u64);
        }
        info!(
            region = %region.id,
            slots = stations.len(),
            degraded,
            "Aggregated region"
        );

        Ok(RegionResponse {
            region_id: region.id.clone(),
            name: region.name.clone(),
            unit: region.unit,
            generated_at: Utc::now(),
            ttl_secs: self.ttl_secs,
            stations,
        })
    }
}
