//! Custom model relay.
//!
//! # Data Flow
//! ```text
//! inbound body (bytes)
//!     → parse JSON, extract customModelId
//!     → store.get_by_id(table, id)        (exactly one lookup)
//!     → upstream.forward(model, payload)  (POST, JSON headers)
//!     → inspect::observe(text)            (diagnostics only)
//!     → raw upstream text
//! ```
//!
//! [`Relay`] knows nothing about HTTP servers; the Axum handler in
//! `http::server` turns its result into a response.

pub mod encode;
pub mod error;
pub mod inspect;
pub mod upstream;

use serde_json::Value;
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::store::{self, RecordStore};

pub use error::RelayError;
pub use upstream::UpstreamClient;

/// Inbound field naming the model configuration.
pub const MODEL_ID_FIELD: &str = "customModelId";

/// Resolves model configurations and forwards payloads to them.
#[derive(Clone)]
pub struct Relay {
    store: Arc<dyn RecordStore>,
    upstream: UpstreamClient,
    table: String,
}

impl Relay {
    pub fn new(store: Arc<dyn RecordStore>, upstream: UpstreamClient, table: impl Into<String>) -> Self {
        Self {
            store,
            upstream,
            table: table.into(),
        }
    }

    /// Build a relay from configuration and an already constructed store.
    pub fn from_config(config: &RelayConfig, store: Arc<dyn RecordStore>) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        Ok(Self::new(store, upstream, config.store.table.clone()))
    }

    /// Relay one inbound body and return the upstream's raw text.
    pub async fn relay(&self, body: &[u8]) -> Result<String, RelayError> {
        let payload: Value = serde_json::from_slice(body).map_err(RelayError::MalformedRequest)?;
        let model_id = model_id(&payload)?;

        let model = store::fetch_model(self.store.as_ref(), &self.table, model_id).await?;
        tracing::info!(
            model_id,
            name = model.name.as_deref().unwrap_or(""),
            base_url = %model.base_url,
            "Resolved model configuration"
        );

        let forwarded = encode::to_vec(&payload).map_err(RelayError::MalformedRequest)?;
        let text = self.upstream.forward(&model, forwarded).await?;

        inspect::observe(model_id, &text);
        Ok(text)
    }
}

fn model_id(payload: &Value) -> Result<&str, RelayError> {
    payload
        .get(MODEL_ID_FIELD)
        .and_then(Value::as_str)
        .ok_or(RelayError::MissingModelId)
}
