//! Custom model relay library.
//!
//! Resolves a model configuration by `customModelId` from a record store,
//! forwards the inbound JSON to the configured endpoint and relays the
//! answer back verbatim.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;
pub mod store;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
pub use relay::{Relay, RelayError};
pub use store::{ModelConfig, RecordStore};
