//! Model configuration record.

use serde::{Deserialize, Serialize};

/// Describes where requests for one custom model are forwarded.
///
/// Only `base_url` is required; the remaining columns are carried for
/// logging. Unknown columns in the stored row are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: String,

    pub base_url: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Identifier the upstream endpoint knows the model by.
    #[serde(default)]
    pub model_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub context_length: Option<u64>,

    /// Per-record TLS override. `None` defers to `upstream.accept_invalid_certs`.
    #[serde(default)]
    pub accept_invalid_certs: Option<bool>,
}

impl ModelConfig {
    /// Whether certificate validation is skipped for this record.
    pub fn accepts_invalid_certs(&self, default: bool) -> bool {
        self.accept_invalid_certs.unwrap_or(default)
    }
}

// Stores may key rows by integer or uuid.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}
