//! Diagnostic classification of upstream bodies.
//!
//! Purely observational: the relayed body is never altered by what
//! happens here.

use serde_json::Value;

/// What an upstream body looks like.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// Starts with `{` or `[` and parses.
    Json(Value),
    /// Starts with `{` or `[` but does not parse.
    MalformedJson(String),
    /// Anything else.
    PlainText,
}

impl ResponseShape {
    pub fn label(&self) -> &'static str {
        match self {
            ResponseShape::Json(_) => "json",
            ResponseShape::MalformedJson(_) => "malformed_json",
            ResponseShape::PlainText => "plain_text",
        }
    }
}

/// Classify a body by its first byte, parsing only when it looks like JSON.
pub fn classify(text: &str) -> ResponseShape {
    if !(text.starts_with('{') || text.starts_with('[')) {
        return ResponseShape::PlainText;
    }

    match serde_json::from_str(text) {
        Ok(value) => ResponseShape::Json(value),
        Err(e) => ResponseShape::MalformedJson(e.to_string()),
    }
}

/// Log and count the shape of a relayed body.
pub fn observe(model_id: &str, text: &str) {
    let shape = classify(text);
    crate::observability::metrics::record_response_shape(shape.label());

    match &shape {
        ResponseShape::Json(value) => {
            tracing::info!(model_id, body = %value, "Upstream returned JSON")
        }
        ResponseShape::MalformedJson(error) => {
            tracing::warn!(model_id, error = %error, "Upstream body looks like JSON but failed to parse")
        }
        ResponseShape::PlainText => {
            tracing::info!(model_id, body = %text, "Upstream returned plain text")
        }
    }
}
