//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use model_relay::config::{RelayConfig, StatusMode};
use model_relay::store::MemoryStore;
use model_relay::RelayServer;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Requests received by a mock backend, in arrival order.
pub type Captures = Arc<Mutex<Vec<Captured>>>;

/// Start a mock backend on an ephemeral loopback port that answers every
/// request with `status`, `content_type` and `body`.
pub async fn start_programmable_backend(
    status: u16,
    content_type: &'static str,
    body: &'static str,
) -> (SocketAddr, Captures) {
    let captures: Captures = Arc::default();
    let seen = captures.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let seen = seen.clone();
        async move {
            let (parts, incoming) = request.into_parts();
            let bytes = axum::body::to_bytes(incoming, usize::MAX).await.unwrap();
            seen.lock().unwrap().push(Captured {
                method: parts.method.to_string(),
                uri: parts.uri.to_string(),
                headers: parts.headers,
                body: bytes,
            });

            (
                StatusCode::from_u16(status).unwrap(),
                [("content-type", content_type)],
                body,
            )
                .into_response()
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, captures)
}

/// Start a mock backend that answers `{}` only after `delay`.
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        (StatusCode::OK, [("content-type", "application/json")], "{}")
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Relay config for tests: static store, legacy statuses unless overridden.
pub fn test_config(mode: StatusMode) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.errors.status_mode = mode;
    config.upstream.timeout_secs = 5;
    config
}

/// Store with one model `id` pointing at `base_url`.
pub fn store_with(id: &str, base_url: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert("models", id, json!({ "id": id, "base_url": base_url }));
    store
}

/// Send a POST with `body` to the relay endpoint in-process.
pub async fn post_relay(router: Router, body: impl Into<Body>) -> Response {
    router
        .oneshot(
            Request::post(model_relay::http::RELAY_PATH)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Build a router over `store` with `config`.
pub fn relay_router(config: RelayConfig, store: Arc<MemoryStore>) -> Router {
    RelayServer::new(config, store).unwrap().router()
}

/// Collect a response body.
pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
}
