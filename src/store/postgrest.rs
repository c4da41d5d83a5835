//! Supabase / PostgREST record store.
//!
//! # Request shape
//! ```text
//! GET {url}/rest/v1/{table}?id=eq.{id}&select=*
//! apikey: {service_key}
//! Authorization: Bearer {service_key}
//! Accept: application/vnd.pgrst.object+json
//! ```
//!
//! The single-object `Accept` type makes PostgREST answer 406 with code
//! `PGRST116` when the filter matches zero (or several) rows.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::config::StoreConfig;
use crate::store::{RecordStore, StoreError};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const NO_SINGLE_ROW: &str = "PGRST116";

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Record store backed by a Supabase project's REST API.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
}

impl PostgrestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key).map_err(|e| StoreError::Backend {
            message: format!("invalid service key: {e}"),
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key)).map_err(
            |e| StoreError::Backend {
                message: format!("invalid service key: {e}"),
            },
        )?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn row_url(&self, table: &str, id: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&format!("{}/rest/v1/", self.base_url)).map_err(|e| {
            StoreError::Backend {
                message: format!("invalid store url {}: {e}", self.base_url),
            }
        })?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Backend {
                message: format!("store url cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .push(table);
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("select", "*");
        Ok(url)
    }
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn get_by_id(&self, table: &str, id: &str) -> Result<Value, StoreError> {
        let url = self.row_url(table, id)?;
        tracing::debug!(table, id, "Fetching record");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        Err(classify_error(status, &text))
    }
}

/// Turn a non-success PostgREST answer into a [`StoreError`].
///
/// Bodies without a `message` get a descriptive fallback instead of an
/// empty error.
fn classify_error(status: StatusCode, text: &str) -> StoreError {
    let body: PostgrestError = serde_json::from_str(text).unwrap_or_default();

    let message = match (body.message, body.details) {
        (Some(message), Some(details)) if !details.is_empty() => format!("{message} ({details})"),
        (Some(message), _) => message,
        (None, _) if text.is_empty() => format!("record store returned status {}", status.as_u16()),
        (None, _) => format!("record store returned status {}: {}", status.as_u16(), text),
    };

    // A 404 means the table itself is unknown, not that the row is missing.
    let not_found =
        body.code.as_deref() == Some(NO_SINGLE_ROW) || status == StatusCode::NOT_ACCEPTABLE;

    if not_found {
        StoreError::NotFound { message }
    } else {
        StoreError::Backend { message }
    }
}
