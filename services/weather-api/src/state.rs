//! Shared application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use storage::ReadingStore;

use crate::aggregator::Aggregator;
use crate::collector::Collector;
use crate::config::StationCatalog;
use crate::warming::CacheWarmer;

pub struct AppState {
    pub catalog: Arc<StationCatalog>,
    pub collector: Arc<Collector>,
    pub aggregator: Aggregator,
    pub warmer: CacheWarmer,
    /// Renders `/metrics`; absent when no recorder was installed.
    pub prometheus: Option<PrometheusHandle>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        catalog: Arc<StationCatalog>,
        collector: Arc<Collector>,
        warmer: CacheWarmer,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(catalog.clone(), collector.clone()),
            catalog,
            collector,
            warmer,
            prometheus,
            started_at: Utc::now(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ReadingStore> {
        self.collector.store()
    }

    /// TTL advertised in served documents.
    pub fn ttl_secs(&self) -> u64 {
        self.collector.settings().reading_ttl.as_secs()
    }
}
