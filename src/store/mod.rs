//! Record store subsystem.
//!
//! The relay needs exactly one capability from the database holding model
//! configurations: fetch a record by primary key. [`RecordStore`] is that
//! capability; [`fetch_model`] decodes the record into a [`ModelConfig`].
//!
//! # Implementations
//! - [`PostgrestStore`]: Supabase REST API
//! - [`MemoryStore`]: in-process map, used for static configs and tests

pub mod memory;
pub mod model;
pub mod postgrest;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};

pub use memory::MemoryStore;
pub use model::ModelConfig;
pub use postgrest::PostgrestStore;

/// Errors reported by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the requested id.
    #[error("{message}")]
    NotFound { message: String },

    /// The store answered but reported an error.
    #[error("{message}")]
    Backend { message: String },

    /// The store could not be reached.
    #[error("record store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The record exists but does not describe a model.
    #[error("malformed model record: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Point lookup by primary key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the row of `table` whose `id` equals `id`.
    async fn get_by_id(&self, table: &str, id: &str) -> Result<Value, StoreError>;
}

/// Fetch and decode one model configuration.
pub async fn fetch_model(
    store: &dyn RecordStore,
    table: &str,
    id: &str,
) -> Result<ModelConfig, StoreError> {
    let record = store.get_by_id(table, id).await?;
    Ok(serde_json::from_value(record)?)
}

/// Build the store selected by configuration.
pub fn from_config(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    match config.backend {
        StoreBackend::Postgrest => Ok(Arc::new(PostgrestStore::new(config)?)),
        StoreBackend::Static => Ok(Arc::new(MemoryStore::from_static(
            &config.table,
            &config.models,
        ))),
    }
}
