//! Common test utilities for in-process server testing.
//!
//! Two entry points:
//! - [`TestFixture`] drives the router directly with `oneshot` requests.
//! - [`TestServer`] binds a real listener so WebSocket clients can connect.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use calaxis_core::{Config, TrainingConfig};
use calaxis_server::{api::create_router, state::AppState};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Config for tests: full 30-step runs with a short step interval.
pub fn test_config(step_interval_ms: u64) -> Config {
    Config {
        training: TrainingConfig {
            step_interval_ms,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// In-process router for request/response testing.
pub struct TestFixture {
    pub router: Router,
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(test_config(0))
    }

    pub fn with_config(config: Config) -> Self {
        let state = Arc::new(AppState::new(config));
        let router = create_router(Arc::clone(&state));
        Self { router, state }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into()))
        };

        TestResponse { status, body }
    }
}

/// Server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(config: Config) -> Self {
        let state = Arc::new(AppState::new(config));
        let app = create_router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Open the progress stream for a job.
    pub async fn connect(&self, job_id: &str) -> WsClient {
        let url = format!("ws://{}/ws/training/{}", self.addr, job_id);
        let (client, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("Failed to connect WebSocket");
        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Next JSON text frame, or `None` once the server closes the stream.
pub async fn next_payload(client: &mut WsClient) -> Option<Value> {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(10), client.next())
            .await
            .expect("Timed out waiting for a WebSocket message");

        match next {
            Some(Ok(Message::Text(text))) => {
                return Some(serde_json::from_str(text.as_str()).expect("Invalid JSON payload"))
            }
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

/// Every payload until the server closes the stream.
pub async fn collect_payloads(client: &mut WsClient) -> Vec<Value> {
    let mut payloads = Vec::new();
    while let Some(payload) = next_payload(client).await {
        payloads.push(payload);
    }
    payloads
}
