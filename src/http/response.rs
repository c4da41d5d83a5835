//! Response construction.
//!
//! # Responsibilities
//! - Relay upstream text verbatim with a fixed 200 and JSON content type
//! - Render failures as the `{error, details, stack, name}` envelope
//!
//! # Design Decisions
//! - The upstream's own status and content type are not propagated
//! - The envelope body is the same whatever status policy is active

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::StatusMode;
use crate::relay::RelayError;

/// Fixed `error` field of every envelope.
pub const GENERIC_ERROR: &str = "An error occurred";

/// JSON body returned on any relay failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub details: String,
    pub stack: String,
    pub name: String,
}

impl From<&RelayError> for ErrorEnvelope {
    fn from(err: &RelayError) -> Self {
        Self {
            error: GENERIC_ERROR.to_string(),
            details: err.to_string(),
            stack: err.trace(),
            name: err.name().to_string(),
        }
    }
}

/// 200 with the upstream text as body.
pub fn relay_response(text: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        Body::from(text),
    )
        .into_response()
}

/// The error envelope with the status chosen by `mode`.
pub fn error_response(err: &RelayError, mode: StatusMode) -> Response {
    (err.status(mode), Json(ErrorEnvelope::from(err))).into_response()
}
