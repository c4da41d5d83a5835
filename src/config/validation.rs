//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the selected store backend has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{RelayConfig, StoreBackend};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid socket address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("store.url is not a valid URL: {0}")]
    InvalidStoreUrl(String),

    #[error("static store backend needs at least one [[store.models]] entry")]
    NoStaticModels,

    #[error("duplicate static model id: {0}")]
    DuplicateModel(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::Empty("listener.tls.cert_path"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::Empty("listener.tls.key_path"));
        }
    }

    if config.store.table.is_empty() {
        errors.push(ValidationError::Empty("store.table"));
    }

    match config.store.backend {
        StoreBackend::Postgrest => {
            if config.store.url.is_empty() {
                errors.push(ValidationError::Empty("store.url"));
            } else if url::Url::parse(&config.store.url).is_err() {
                errors.push(ValidationError::InvalidStoreUrl(config.store.url.clone()));
            }
            if config.store.service_key.is_empty() {
                errors.push(ValidationError::Empty("store.service_key"));
            }
            if config.store.timeout_secs == 0 {
                errors.push(ValidationError::Zero("store.timeout_secs"));
            }
        }
        StoreBackend::Static => {
            if config.store.models.is_empty() {
                errors.push(ValidationError::NoStaticModels);
            }
            let mut seen = std::collections::HashSet::new();
            for model in &config.store.models {
                if !seen.insert(model.id.as_str()) {
                    errors.push(ValidationError::DuplicateModel(model.id.clone()));
                }
            }
        }
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.connect_timeout_secs"));
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("limits.request_timeout_secs"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::Zero("limits.max_body_size"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
