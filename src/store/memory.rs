//! In-process record store.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::config::StaticModel;
use crate::store::{RecordStore, StoreError};

/// Records keyed by `(table, id)`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(String, String), Value>>,
    lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from `[[store.models]]` entries.
    pub fn from_static(table: &str, models: &[StaticModel]) -> Self {
        let store = Self::new();
        for model in models {
            store.insert(
                table,
                &model.id,
                json!({
                    "id": model.id,
                    "base_url": model.base_url,
                    "name": model.name,
                    "accept_invalid_certs": model.accept_invalid_certs,
                }),
            );
        }
        store
    }

    pub fn insert(&self, table: &str, id: &str, record: Value) {
        self.records
            .write()
            .expect("memory store lock poisoned")
            .insert((table.to_string(), id.to_string()), record);
    }

    /// Number of `get_by_id` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_by_id(&self, table: &str, id: &str) -> Result<Value, StoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        self.records
            .read()
            .expect("memory store lock poisoned")
            .get(&(table.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                message: format!("no row in {table} with id {id}"),
            })
    }
}
