//! Station weather API server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use storage::{MemoryReadingCache, ReadingStore, RedisReadingCache};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use weather_api::{
    build_router, metrics::describe_metrics, AppState, CacheWarmer, Collector, CollectorSettings,
    StationCatalog,
};

/// Station weather API server
#[derive(Parser, Debug)]
#[command(name = "weather-api")]
#[command(about = "Collects, caches and serves normalized weather station readings")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8787", env = "WEATHER_LISTEN_ADDR")]
    listen: String,

    /// Station catalogue (YAML)
    #[arg(short, long, default_value = "config/stations.yaml", env = "WEATHER_CONFIG")]
    config: String,

    /// Redis URL; the in-memory cache is used when absent
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Seconds between scheduled warm cycles
    #[arg(long, default_value = "300", env = "WEATHER_WARM_INTERVAL_SECS")]
    warm_interval_secs: u64,

    /// Maximum stations collected at once during a warm cycle
    #[arg(long, default_value = "8")]
    warm_concurrency: usize,

    /// Disable the scheduled warm cycle
    #[arg(long)]
    no_warm: bool,

    /// Run a single warm cycle and exit
    #[arg(long)]
    once: bool,

    /// How long the last good reading stays available as a stale fallback
    #[arg(long, default_value = "3600", env = "WEATHER_STALE_SECS")]
    stale_secs: u64,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "WEATHER_LOG_JSON")]
    log_json: bool,
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.log_json {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .json()
            .init();
    } else {
        fmt().with_env_filter(filter).with_target(false).compact().init();
    }
}

async fn connect_store(redis_url: Option<&str>) -> Result<Arc<dyn ReadingStore>> {
    match redis_url {
        Some(url) => {
            let cache = RedisReadingCache::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            cache.ping().await.context("Redis did not answer PING")?;
            info!("Using Redis reading cache");
            Ok(Arc::new(cache))
        }
        None => {
            info!("REDIS_URL not set, using in-memory reading cache");
            Ok(Arc::new(MemoryReadingCache::default()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    info!(config = %args.config, "Starting weather API");

    let catalog = Arc::new(StationCatalog::load(&args.config)?);
    let store = connect_store(args.redis_url.as_deref()).await?;

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    describe_metrics();

    let client = catalog
        .fetch
        .build_client()
        .context("Failed to create HTTP client")?;
    let settings = CollectorSettings {
        stale_ttl: Duration::from_secs(args.stale_secs),
        ..CollectorSettings::default()
    };
    let collector = Arc::new(Collector::from_catalog(&catalog, client, store, settings));
    let warmer = CacheWarmer::new(
        collector.clone(),
        Duration::from_secs(args.warm_interval_secs.max(1)),
        args.warm_concurrency,
    );

    if args.once {
        let summary = warmer.run_cycle(true).await;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if args.no_warm {
        info!("Scheduled warming disabled");
    } else {
        warmer.clone().spawn();
    }

    let state = Arc::new(AppState::new(catalog, collector, warmer, Some(prometheus)));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    info!(addr = %args.listen, "Weather API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    Ok(())
}
