//! Shared fixtures for weather-api integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use station_sources::{RawSample, RetryPolicy, SourceError, SourceKind, SourceResult, StationSource};
use storage::MemoryReadingCache;
use test_utils::fixtures::{PUBLIC_JSON, PUBLIC_JSON_STATION};
use weather_api::{AppState, CacheWarmer, Collector, CollectorSettings, StationCatalog};

pub const CATALOG: &str = r#"
stations:
  - id: alpha
    name: Alpha Ridge
    source: { type: public_json, base_url: "http://127.0.0.1:9", station: 1 }
  - id: bravo
    name: Bravo Col
    source: { type: public_json, base_url: "http://127.0.0.1:9", station: 2 }
  - id: charlie
    name: Charlie Peak
    source: { type: public_json, base_url: "http://127.0.0.1:9", station: 3 }
regions:
  - id: alps
    name: Alps
    unit: kmh
    stations: [alpha, bravo, charlie]
"#;

/// Public JSON body with the average speed replaced (km/h).
pub fn public_body(avg_kmh: f64) -> String {
    PUBLIC_JSON.replace("\"wind_speed_avg\": 18.0", &format!("\"wind_speed_avg\": {:.1}", avg_kmh))
}

pub fn good() -> SourceResult<RawSample> {
    Ok(RawSample::PublicJson {
        body: PUBLIC_JSON.to_string(),
        expected_station: PUBLIC_JSON_STATION,
    })
}

pub fn good_with_speed(avg_kmh: f64) -> SourceResult<RawSample> {
    Ok(RawSample::PublicJson {
        body: public_body(avg_kmh),
        expected_station: PUBLIC_JSON_STATION,
    })
}

pub fn down() -> SourceResult<RawSample> {
    Err(SourceError::HttpStatus { status: 503 })
}

/// Parses but lacks a wind direction.
pub fn invalid() -> SourceResult<RawSample> {
    Ok(RawSample::HtmlTable {
        html: "<table><tr><td>Wind Speed</td><td>9 Knots</td></tr></table>".to_string(),
        labels: Default::default(),
    })
}

/// Scripted adapter: answers from a queue, then repeats `fallback`.
pub struct FakeSource {
    id: String,
    script: Mutex<VecDeque<SourceResult<RawSample>>>,
    fallback: SourceResult<RawSample>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    policy: RetryPolicy,
}

impl FakeSource {
    pub fn new(id: &str, fallback: SourceResult<RawSample>) -> Self {
        Self {
            id: id.to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
            policy: RetryPolicy::immediate(1),
        }
    }

    pub fn then(self, response: SourceResult<RawSample>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StationSource for FakeSource {
    fn station_id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::PublicJson
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn fetch(&self) -> SourceResult<RawSample> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

pub struct Harness {
    pub catalog: Arc<StationCatalog>,
    pub store: Arc<MemoryReadingCache>,
    pub collector: Arc<Collector>,
    pub sources: Vec<Arc<FakeSource>>,
}

impl Harness {
    pub fn new(sources: Vec<FakeSource>) -> Self {
        let catalog = Arc::new(StationCatalog::from_yaml(CATALOG).unwrap());
        let store = Arc::new(MemoryReadingCache::new(64));
        let mut collector = Collector::new(store.clone(), CollectorSettings::default());
        let sources: Vec<Arc<FakeSource>> = sources.into_iter().map(Arc::new).collect();
        for source in &sources {
            collector.register(source.clone());
        }
        Self {
            catalog,
            store,
            collector: Arc::new(collector),
            sources,
        }
    }

    /// alpha, bravo, charlie answering with the given results.
    pub fn region(alpha: SourceResult<RawSample>, bravo: SourceResult<RawSample>, charlie: SourceResult<RawSample>) -> Self {
        Self::new(vec![
            FakeSource::new("alpha", alpha),
            FakeSource::new("bravo", bravo),
            FakeSource::new("charlie", charlie),
        ])
    }

    pub fn state(&self) -> Arc<AppState> {
        let warmer = CacheWarmer::new(self.collector.clone(), Duration::from_secs(300), 4);
        Arc::new(AppState::new(
            self.catalog.clone(),
            self.collector.clone(),
            warmer,
            None,
        ))
    }
}
