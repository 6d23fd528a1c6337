//! Metric names and descriptions.

use metrics::{describe_counter, describe_histogram, Unit};

pub const STATION_COLLECT_TOTAL: &str = "station_collect_total";
pub const STATION_COLLECT_DURATION_MS: &str = "station_collect_duration_ms";
pub const READING_CACHE_HITS_TOTAL: &str = "reading_cache_hits_total";
pub const READING_CACHE_MISSES_TOTAL: &str = "reading_cache_misses_total";
pub const REGION_AGGREGATE_TOTAL: &str = "region_aggregate_total";
pub const REGION_STATION_FAILURES_TOTAL: &str = "region_station_failures_total";
pub const WARM_CYCLES_TOTAL: &str = "warm_cycles_total";

/// Register help text with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(
        STATION_COLLECT_TOTAL,
        "Station collections by outcome (cached, fresh, error, invalid)"
    );
    describe_histogram!(
        STATION_COLLECT_DURATION_MS,
        Unit::Milliseconds,
        "Upstream fetch and parse time per station"
    );
    describe_counter!(READING_CACHE_HITS_TOTAL, "Bucket cache hits");
    describe_counter!(READING_CACHE_MISSES_TOTAL, "Bucket cache misses");
    describe_counter!("source_retry_total", "Upstream attempts that were retried");
    describe_counter!(REGION_AGGREGATE_TOTAL, "Region aggregations");
    describe_counter!(
        REGION_STATION_FAILURES_TOTAL,
        "Region slots degraded to stale or placeholder"
    );
    describe_counter!(WARM_CYCLES_TOTAL, "Scheduled pre-warm cycles");
}
