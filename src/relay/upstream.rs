//! Outbound client for model endpoints.
//!
//! Two `reqwest` clients are built once at startup: one that validates
//! certificates and one that does not. Each request picks one from the
//! model record's override, falling back to `upstream.accept_invalid_certs`.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::store::ModelConfig;

const APPLICATION_JSON: &str = "application/json";

/// Forwards payloads to the endpoint named by a [`ModelConfig`].
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    verified: Client,
    unverified: Client,
    accept_invalid_certs: bool,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let builder = || {
            Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        };

        if config.accept_invalid_certs {
            tracing::warn!("Certificate validation disabled for all model endpoints by default");
        }

        Ok(Self {
            verified: builder().build()?,
            unverified: builder().danger_accept_invalid_certs(true).build()?,
            accept_invalid_certs: config.accept_invalid_certs,
        })
    }

    /// Whether requests for `model` skip certificate validation.
    pub fn skips_verification(&self, model: &ModelConfig) -> bool {
        model.accepts_invalid_certs(self.accept_invalid_certs)
    }

    /// POST `body` to the model's `base_url` and return the response text.
    ///
    /// Non-success statuses become [`RelayError::UpstreamStatus`] carrying
    /// the full response text.
    pub async fn forward(&self, model: &ModelConfig, body: Vec<u8>) -> Result<String, RelayError> {
        let client = if self.skips_verification(model) {
            tracing::warn!(
                model_id = %model.id,
                base_url = %model.base_url,
                "Forwarding without certificate validation"
            );
            &self.unverified
        } else {
            &self.verified
        };

        let response = client
            .post(&model.base_url)
            .header(ACCEPT, APPLICATION_JSON)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(body)
            .send()
            .await
            .map_err(RelayError::Upstream)?;

        let status = response.status();
        metrics::record_upstream_status(status.as_u16());

        let text = response.text().await.map_err(RelayError::Upstream)?;

        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(accept_invalid_certs: Option<bool>) -> ModelConfig {
        serde_json::from_value(json!({
            "id": "m1",
            "base_url": "https://self-signed.internal/v1",
            "accept_invalid_certs": accept_invalid_certs,
        }))
        .unwrap()
    }

    #[test]
    fn test_verification_on_by_default() {
        let client = UpstreamClient::new(&UpstreamConfig::default()).unwrap();
        assert!(!client.skips_verification(&model(None)));
        assert!(client.skips_verification(&model(Some(true))));
    }

    #[test]
    fn test_record_can_opt_out_of_global_insecure() {
        let config = UpstreamConfig {
            accept_invalid_certs: true,
            ..UpstreamConfig::default()
        };
        let client = UpstreamClient::new(&config).unwrap();
        assert!(client.skips_verification(&model(None)));
        assert!(!client.skips_verification(&model(Some(false))));
    }
}
