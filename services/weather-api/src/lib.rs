//! Station weather service.
//!
//! Collects readings from the configured upstream stations with a
//! cache-first [`Collector`], groups them into fixed three-slot regions with
//! the [`Aggregator`], pre-warms the cache on a schedule and serves JSON and
//! display text over HTTP.

pub mod aggregator;
pub mod collector;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;
pub mod warming;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use aggregator::Aggregator;
pub use collector::{Collector, CollectorSettings};
pub use config::{CatalogFile, StationCatalog};
pub use error::CollectError;
pub use state::AppState;
pub use warming::{CacheWarmer, WarmSummary};

/// Build the HTTP router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/v1/stations/:station_id",
            get(handlers::stations::station_handler),
        )
        .route(
            "/api/v1/stations/:station_id/display",
            get(handlers::stations::station_display_handler),
        )
        .route("/api/v1/regions", get(handlers::regions::list_regions_handler))
        .route(
            "/api/v1/regions/:region_id",
            get(handlers::regions::region_handler),
        )
        .route(
            "/api/v1/regions/:region_id/display",
            get(handlers::regions::region_display_handler),
        )
        .route("/api/v1/collect", post(handlers::collect::collect_handler))
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
