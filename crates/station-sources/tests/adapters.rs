//! Adapter tests against a stub upstream.

use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use station_sources::{
    build_source, FetchConfig, SourceConfig, SourceError, SourceKind, StationConfig,
    TableLabels,
};
use test_utils::fixtures::{
    session_history, FALLBACK_JSON, PRIMARY_JSON, PRIMARY_JSON_ERROR, PUBLIC_JSON,
    PUBLIC_JSON_STATION, SESSION_COOKIE_NAME, SESSION_LIVE, SESSION_LIVE_EPOCH, SESSION_TOKEN,
    TABLE_PAGE, TABLE_PAGE_MAINTENANCE,
};
use test_utils::{assert_some_approx_eq, StubResponse, StubServer};

fn fast_fetch() -> FetchConfig {
    FetchConfig {
        initial_delay_ms: 0,
        backoff_multiplier: 1.0,
        attempt_timeout_ms: 2_000,
        session_wait_ms: 0,
        ..FetchConfig::default()
    }
}

fn station(id: &str, source: SourceConfig) -> StationConfig {
    StationConfig {
        id: id.to_string(),
        name: id.to_string(),
        source,
    }
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 3, 0).unwrap()
}

fn session_cookie() -> String {
    format!("{}={}; path=/; HttpOnly", SESSION_COOKIE_NAME, SESSION_TOKEN)
}

fn session_station(server: &StubServer) -> StationConfig {
    station(
        "seaview",
        SourceConfig::SessionBinary {
            session_url: server.url("/view.php"),
            live_url: server.url("/live"),
            history_url: server.url("/history"),
            session_cookie: SESSION_COOKIE_NAME.to_string(),
        },
    )
}

fn primary_station(server: &StubServer) -> StationConfig {
    station(
        "lymington",
        SourceConfig::PrimaryFallbackJson {
            primary_url: server.url("/primary"),
            fallback_url: server.url("/fallback"),
            auth_header: "wf-tkn".to_string(),
            token: "secret".to_string(),
            token_env: None,
        },
    )
}

#[tokio::test]
async fn test_table_scrape_reads_page() {
    let server = StubServer::builder()
        .get("/weather", StubResponse::ok(TABLE_PAGE))
        .start()
        .await;
    let source = build_source(
        &station(
            "brambles",
            SourceConfig::TableScrape {
                url: server.url("/weather"),
                labels: TableLabels::default(),
            },
        ),
        &fast_fetch(),
        reqwest::Client::new(),
    );
    assert_eq!(source.kind(), SourceKind::TableScrape);

    let reading = source.read(now()).await.unwrap();
    assert!(reading.is_valid);
    assert_some_approx_eq!(reading.wind_speed, 8.08, 0.01);
    assert_eq!(reading.wind_direction, Some(225));
    assert_eq!(reading.timestamp, now());
}

#[tokio::test]
async fn test_table_scrape_retries_then_succeeds() {
    let server = StubServer::builder()
        .get("/weather", StubResponse::ok(TABLE_PAGE).fail_first(2))
        .start()
        .await;
    let source = build_source(
        &station(
            "brambles",
            SourceConfig::TableScrape {
                url: server.url("/weather"),
                labels: TableLabels::default(),
            },
        ),
        &fast_fetch(),
        reqwest::Client::new(),
    );

    assert!(source.read(now()).await.is_ok());
    assert_eq!(server.hits("/weather").await, 3);
}

#[tokio::test]
async fn test_malformed_page_exhausts_retries() {
    let server = StubServer::builder()
        .get("/weather", StubResponse::ok(TABLE_PAGE_MAINTENANCE))
        .start()
        .await;
    let source = build_source(
        &station(
            "brambles",
            SourceConfig::TableScrape {
                url: server.url("/weather"),
                labels: TableLabels::default(),
            },
        ),
        &fast_fetch(),
        reqwest::Client::new(),
    );

    let err = source.read(now()).await.unwrap_err();
    assert!(matches!(err, SourceError::Schema { .. }));
    assert_eq!(server.hits("/weather").await, 3);
}

#[tokio::test]
async fn test_session_cookie_is_threaded_to_data_calls() {
    let history = session_history(&[
        (SESSION_LIVE_EPOCH - 20, 19.0, 3.0, 180),
        (SESSION_LIVE_EPOCH - 10, 19.0, 4.0, 190),
        (SESSION_LIVE_EPOCH, 19.0, 5.0, 200),
    ]);
    let server = StubServer::builder()
        .get(
            "/view.php",
            StubResponse::ok("<html></html>").header("set-cookie", &session_cookie()),
        )
        .get("/live", StubResponse::ok(SESSION_LIVE))
        .get("/history", StubResponse::ok(history))
        .start()
        .await;
    let source = build_source(&session_station(&server), &fast_fetch(), reqwest::Client::new());

    let reading = source.read(now()).await.unwrap();

    let expected_cookie = format!("{}={}", SESSION_COOKIE_NAME, SESSION_TOKEN);
    for request in server.requests().await {
        if request.path != "/view.php" {
            assert_eq!(request.header("cookie"), Some(expected_cookie.as_str()));
        }
    }
    assert_eq!(server.hits("/view.php").await, 1);

    // Historical wind, live temperature
    assert_some_approx_eq!(reading.wind_speed, 4.0, 1e-9);
    assert_some_approx_eq!(reading.wind_gust, 5.0, 1e-9);
    assert_eq!(reading.wind_direction, Some(190));
    assert_eq!(reading.temperature, Some(15.0));
    assert!(reading.wind_gust >= reading.wind_speed);
    assert_eq!(reading.timestamp.timestamp(), SESSION_LIVE_EPOCH);
}

#[tokio::test]
async fn test_session_failure_is_hard_error() {
    let server = StubServer::builder()
        .get("/view.php", StubResponse::ok("<html></html>"))
        .get("/live", StubResponse::ok(SESSION_LIVE))
        .get("/history", StubResponse::ok(SESSION_LIVE))
        .start()
        .await;
    let source = build_source(&session_station(&server), &fast_fetch(), reqwest::Client::new());

    let err = source.read(now()).await.unwrap_err();
    assert!(matches!(err, SourceError::Session(_)), "{:?}", err);
    assert_eq!(server.hits("/live").await, 0);
    assert_eq!(server.hits("/history").await, 0);
}

#[tokio::test]
async fn test_history_failure_falls_back_to_live_without_gust() {
    let server = StubServer::builder()
        .get(
            "/view.php",
            StubResponse::ok("").header("set-cookie", &session_cookie()),
        )
        .get("/live", StubResponse::ok(SESSION_LIVE))
        .get("/history", StubResponse::status(500))
        .start()
        .await;
    let source = build_source(&session_station(&server), &fast_fetch(), reqwest::Client::new());

    let reading = source.read(now()).await.unwrap();
    assert_eq!(reading.wind_gust, None);
    assert_eq!(reading.wind_speed, Some(3.7));
    assert_eq!(server.hits("/history").await, 3);
}

#[tokio::test]
async fn test_history_and_live_failing_reports_history_error() {
    let server = StubServer::builder()
        .get(
            "/view.php",
            StubResponse::ok("").header("set-cookie", &session_cookie()),
        )
        .get("/live", StubResponse::status(502))
        .get("/history", StubResponse::status(500))
        .start()
        .await;
    let source = build_source(&session_station(&server), &fast_fetch(), reqwest::Client::new());

    let err = source.read(now()).await.unwrap_err();
    assert_eq!(err, SourceError::HttpStatus { status: 500 });
    assert_eq!(server.hits("/history").await, 3);
    assert_eq!(server.hits("/live").await, 3);
}

#[tokio::test]
async fn test_session_live_mode_fetch() {
    let server = StubServer::builder()
        .get(
            "/view.php",
            StubResponse::ok("").header("set-cookie", &session_cookie()),
        )
        .get("/live", StubResponse::ok(SESSION_LIVE))
        .start()
        .await;
    let source = build_source(&session_station(&server), &fast_fetch(), reqwest::Client::new());

    let raw = source.fetch().await.unwrap();
    assert_eq!(raw, station_sources::RawSample::LiveText(SESSION_LIVE.to_string()));
}

#[tokio::test]
async fn test_primary_sends_auth_header_and_empty_post() {
    let server = StubServer::builder()
        .post("/primary", StubResponse::ok(PRIMARY_JSON))
        .post("/fallback", StubResponse::ok(FALLBACK_JSON))
        .start()
        .await;
    let source = build_source(&primary_station(&server), &fast_fetch(), reqwest::Client::new());

    let reading = source.read(now()).await.unwrap();
    assert_some_approx_eq!(reading.wind_gust, 18.9 * 0.514444, 1e-9);
    assert_eq!(server.hits("/fallback").await, 0);

    let requests = server.requests().await;
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].header("wf-tkn"), Some("secret"));
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_primary_without_token_omits_auth_header() {
    let server = StubServer::builder()
        .post("/primary", StubResponse::ok(PRIMARY_JSON))
        .start()
        .await;
    let config = station(
        "lymington",
        SourceConfig::PrimaryFallbackJson {
            primary_url: server.url("/primary"),
            fallback_url: server.url("/fallback"),
            auth_header: "wf-tkn".to_string(),
            token: String::new(),
            token_env: Some("STATION_WEATHER_ADAPTER_TOKEN_NEVER_SET".to_string()),
        },
    );
    let source = build_source(&config, &fast_fetch(), reqwest::Client::new());

    assert!(source.read(now()).await.is_ok());
    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("wf-tkn"), None);
}

#[tokio::test]
async fn test_primary_error_status_uses_fallback() {
    let server = StubServer::builder()
        .post("/primary", StubResponse::status(502))
        .post("/fallback", StubResponse::ok(FALLBACK_JSON))
        .start()
        .await;
    let source = build_source(&primary_station(&server), &fast_fetch(), reqwest::Client::new());

    let reading = source.read(now()).await.unwrap();
    assert_eq!(reading.wind_gust, None);
    assert_eq!(reading.wind_direction, Some(240));
    assert_eq!(server.hits("/primary").await, 1);
    assert_eq!(server.hits("/fallback").await, 1);
}

#[tokio::test]
async fn test_primary_schema_mismatch_uses_fallback() {
    let server = StubServer::builder()
        .post("/primary", StubResponse::ok(PRIMARY_JSON_ERROR))
        .post("/fallback", StubResponse::ok(FALLBACK_JSON))
        .start()
        .await;
    let source = build_source(&primary_station(&server), &fast_fetch(), reqwest::Client::new());

    let reading = source.read(now()).await.unwrap();
    assert!(reading.is_valid);
    assert_eq!(reading.wind_gust, None);
    assert_eq!(
        server
            .requests()
            .await
            .iter()
            .filter(|r| r.path == "/fallback")
            .filter_map(|r| r.header("wf-tkn"))
            .collect::<Vec<_>>(),
        vec!["secret"]
    );
}

#[tokio::test]
async fn test_public_json_hits_station_path() {
    let server = StubServer::builder()
        .get("/live/521", StubResponse::ok(PUBLIC_JSON))
        .start()
        .await;
    let source = build_source(
        &station(
            "prarion",
            SourceConfig::PublicJson {
                base_url: server.url("/live/"),
                station: PUBLIC_JSON_STATION,
            },
        ),
        &fast_fetch(),
        reqwest::Client::new(),
    );

    let reading = source.read(now()).await.unwrap();
    assert_eq!(reading.station_id, "prarion");
    assert_some_approx_eq!(reading.wind_speed, 5.0, 1e-9);
    assert_eq!(reading.wind_direction, Some(293));
}

#[tokio::test]
async fn test_public_json_rejects_misrouted_station() {
    let server = StubServer::builder()
        .get("/live/600", StubResponse::ok(PUBLIC_JSON))
        .start()
        .await;
    let source = build_source(
        &station(
            "planpraz",
            SourceConfig::PublicJson {
                base_url: server.url("/live"),
                station: 600,
            },
        ),
        &fast_fetch(),
        reqwest::Client::new(),
    );

    let err = source.read(now()).await.unwrap_err();
    assert!(matches!(err, SourceError::Schema { .. }));
}

#[tokio::test]
async fn test_slow_upstream_times_out_each_attempt() {
    let server = StubServer::builder()
        .get(
            "/live/521",
            StubResponse::ok(PUBLIC_JSON).delay(Duration::from_secs(5)),
        )
        .start()
        .await;
    let source = build_source(
        &station(
            "prarion",
            SourceConfig::PublicJson {
                base_url: server.url("/live"),
                station: PUBLIC_JSON_STATION,
            },
        ),
        &FetchConfig {
            max_attempts: 2,
            attempt_timeout_ms: 100,
            ..fast_fetch()
        },
        reqwest::Client::new(),
    );

    let started = Instant::now();
    let err = source.read(now()).await.unwrap_err();
    assert_eq!(err, SourceError::Timeout(Duration::from_millis(100)));
    assert_eq!(server.hits("/live/521").await, 2);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_unreachable_upstream_is_transport_error() {
    let server = StubServer::builder().start().await;
    let url = server.url("/weather");
    drop(server);
    tokio::task::yield_now().await;

    let source = build_source(
        &station(
            "brambles",
            SourceConfig::TableScrape {
                url,
                labels: TableLabels::default(),
            },
        ),
        &FetchConfig {
            max_attempts: 1,
            ..fast_fetch()
        },
        reqwest::Client::new(),
    );

    let err = source.read(now()).await.unwrap_err();
    assert!(
        matches!(err, SourceError::Transport(_) | SourceError::HttpStatus { .. }),
        "{:?}",
        err
    );
}
