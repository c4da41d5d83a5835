//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Store URL. The `NEXT_PUBLIC_` spelling is accepted for existing deployments.
pub const ENV_STORE_URL: &[&str] = &["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
/// Privileged store credential.
pub const ENV_SERVICE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const ENV_BIND_ADDRESS: &str = "RELAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse TOML text without validating it.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay values supplied by the environment. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(url) = ENV_STORE_URL.iter().find_map(|key| get(key)) {
        config.store.url = url;
    }
    if let Some(key) = get(ENV_SERVICE_KEY) {
        config.store.service_key = key;
    }
    if let Some(addr) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = parse_config(
            r#"
            [store]
            url = "https://from-file.supabase.co"
            service_key = "file-key"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("NEXT_PUBLIC_SUPABASE_URL", "https://from-env.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "env-key"),
            ("RELAY_BIND_ADDRESS", ""),
        ]);
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.store.url, "https://from-env.supabase.co");
        assert_eq!(config.store.service_key, "env-key");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_plain_url_wins_over_next_public() {
        let mut config = RelayConfig::default();
        apply_env_overrides(&mut config, |k| match k {
            "SUPABASE_URL" => Some("https://a.supabase.co".into()),
            "NEXT_PUBLIC_SUPABASE_URL" => Some("https://b.supabase.co".into()),
            _ => None,
        });
        assert_eq!(config.store.url, "https://a.supabase.co");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[store\nurl = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::Validation(vec![
            ValidationError::Empty("store.url"),
            ValidationError::Zero("upstream.timeout_secs"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: store.url must not be empty, upstream.timeout_secs must be greater than zero"
        );
    }
}
