//! Stub upstream HTTP server for adapter and pipeline tests.
//!
//! Binds an axum router to `127.0.0.1:0` and serves canned responses by
//! `(method, path)`. Every request is recorded so tests can assert on
//! headers (session cookies, auth tokens) and on retry counts.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Canned response for one route.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
    /// Answer the first N requests with 503 before serving the body.
    pub fail_first: usize,
    /// Sleep before answering (for timeout tests).
    pub delay: Option<Duration>,
}

impl StubResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            headers: Vec::new(),
            fail_first: 0,
            delay: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            headers: Vec::new(),
            fail_first: 0,
            delay: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn fail_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

struct StubState {
    routes: HashMap<(Method, String), StubResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Default)]
pub struct StubServerBuilder {
    routes: HashMap<(Method, String), StubResponse>,
}

impl StubServerBuilder {
    pub fn route(mut self, method: Method, path: &str, response: StubResponse) -> Self {
        self.routes.insert((method, path.to_string()), response);
        self
    }

    pub fn get(self, path: &str, response: StubResponse) -> Self {
        self.route(Method::GET, path, response)
    }

    pub fn post(self, path: &str, response: StubResponse) -> Self {
        self.route(Method::POST, path, response)
    }

    pub async fn start(self) -> StubServer {
        let state = Arc::new(StubState {
            routes: self.routes,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub");
        });

        StubServer {
            addr,
            state,
            handle,
        }
    }
}

/// Running stub server. Aborted on drop.
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub fn builder() -> StubServerBuilder {
        StubServerBuilder::default()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }

    /// Number of requests received for a path, any method.
    pub async fn hits(&self, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .await
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();

    let seen = {
        let mut requests = state.requests.lock().await;
        let seen = requests
            .iter()
            .filter(|r| r.path == path && r.method == method)
            .count();
        requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            headers,
            body,
        });
        seen
    };

    let Some(stub) = state.routes.get(&(method, path)) else {
        return (StatusCode::NOT_FOUND, "no stub route").into_response();
    };

    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }

    if seen < stub.fail_first {
        return (StatusCode::SERVICE_UNAVAILABLE, "stub failure").into_response();
    }

    let mut response_headers = HeaderMap::new();
    for (name, value) in &stub.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            response_headers.append(name, value);
        }
    }

    let status = StatusCode::from_u16(stub.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, response_headers, stub.body.clone()).into_response()
}
