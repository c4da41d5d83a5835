//! Relay error taxonomy.

use axum::http::StatusCode;
use std::error::Error as _;
use thiserror::Error;

use crate::config::StatusMode;
use crate::store::StoreError;

/// Everything that can stop a request from being relayed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound body is not JSON.
    #[error("request body is not valid JSON: {0}")]
    MalformedRequest(#[source] serde_json::Error),

    /// Inbound JSON has no string `customModelId`.
    #[error("request body must contain a string customModelId")]
    MissingModelId,

    /// Model configuration could not be resolved.
    #[error(transparent)]
    Lookup(#[from] StoreError),

    /// Upstream answered with a non-success status.
    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream could not be reached or its body could not be read.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    /// Inbound body exceeded `limits.max_body_size`.
    #[error("request body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize },

    /// Whole request exceeded `limits.request_timeout_secs`.
    #[error("request did not complete within {secs}s")]
    RequestTimeout { secs: u64 },
}

impl RelayError {
    /// Kind reported in the envelope's `name` field.
    pub fn name(&self) -> &'static str {
        match self {
            RelayError::MalformedRequest(_) => "MalformedRequest",
            RelayError::MissingModelId => "MissingModelId",
            RelayError::Lookup(_) => "LookupError",
            RelayError::UpstreamStatus { .. } => "UpstreamHttpError",
            RelayError::Upstream(_) => "UpstreamError",
            RelayError::BodyTooLarge { .. } => "PayloadTooLarge",
            RelayError::RequestTimeout { .. } => "RequestTimeout",
        }
    }

    /// HTTP status for this error under the given policy.
    pub fn status(&self, mode: StatusMode) -> StatusCode {
        if mode == StatusMode::Legacy {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }

        match self {
            RelayError::MalformedRequest(_) | RelayError::MissingModelId => StatusCode::BAD_REQUEST,
            RelayError::Lookup(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            RelayError::Lookup(_) => StatusCode::BAD_GATEWAY,
            RelayError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
            RelayError::Upstream(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::RequestTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// The error and its sources, one per line. Causes already spelled
    /// out by the message above them are skipped.
    pub fn trace(&self) -> String {
        let mut out = format!("{}: {}", self.name(), self);
        let mut source = self.source();
        while let Some(cause) = source {
            let message = cause.to_string();
            if !out.contains(&message) {
                out.push_str("\n    caused by: ");
                out.push_str(&message);
            }
            source = cause.source();
        }
        out
    }
}
