//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, timeouts, request ID)
//! - Bind server to a plain or TLS listener
//! - Dispatch relay requests and translate their outcome
//! - Render body-limit and timeout rejections as error envelopes

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RelayConfig, StatusMode};
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::{error_response, relay_response};
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::relay::{Relay, RelayError};
use crate::store::RecordStore;

/// Path of the relay endpoint.
pub const RELAY_PATH: &str = "/api/chat/custom";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub status_mode: StatusMode,
    pub max_body_size: usize,
    pub request_timeout_secs: u64,
}

/// HTTP server for the model relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a new HTTP server with the given configuration and store.
    pub fn new(config: RelayConfig, store: Arc<dyn RecordStore>) -> Result<Self, reqwest::Error> {
        let relay = Relay::from_config(&config, store)?;

        let state = AppState {
            relay: Arc::new(relay),
            status_mode: config.errors.status_mode,
            max_body_size: config.limits.max_body_size,
            request_timeout_secs: config.limits.request_timeout_secs,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route(RELAY_PATH, post(relay_handler))
            .route("/health", get(health_handler))
            .with_state(state.clone())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)))
            .layer(from_fn_with_state(state, envelope_rejections))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
    }

    /// The router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serve plain HTTP until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS with the configured certificate until `shutdown` resolves.
    pub async fn run_tls<F>(self, addr: SocketAddr, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let tls = self.config.listener.tls.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "listener.tls is not configured")
        })?;
        let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown.await;
            drain.graceful_shutdown(Some(Duration::from_secs(30)));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Relay handler. Every failure is caught here and rendered as an envelope.
async fn relay_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    tracing::debug!(request_id = %request_id, bytes = body.len(), "Relaying request");

    match state.relay.relay(&body).await {
        Ok(text) => {
            metrics::record_request("relayed", 200, start_time);
            relay_response(text)
        }
        Err(e) => {
            let response = error_response(&e, state.status_mode);
            tracing::error!(
                request_id = %request_id,
                kind = e.name(),
                error = %e,
                status = response.status().as_u16(),
                "Relay failed"
            );
            metrics::record_request(e.name(), response.status().as_u16(), start_time);
            response
        }
    }
}

/// Rewrite the plain 413/408 answers of the limit and timeout layers into
/// envelopes. The relay handler itself never produces either status.
async fn envelope_rejections(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request_id(request.headers());
    let response = next.run(request).await;

    let err = match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => RelayError::BodyTooLarge {
            limit: state.max_body_size,
        },
        StatusCode::REQUEST_TIMEOUT => RelayError::RequestTimeout {
            secs: state.request_timeout_secs,
        },
        _ => return response,
    };

    let rewritten = error_response(&err, state.status_mode);
    tracing::warn!(
        request_id = %request_id,
        kind = err.name(),
        error = %err,
        status = rewritten.status().as_u16(),
        "Request rejected"
    );
    rewritten
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
