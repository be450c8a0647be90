//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default HTTP port of a ledger node.
pub const DEFAULT_PORT: u16 = 5000;

/// Default request body limit (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Main gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind host
    pub host: String,
    /// Bind port (0 picks an ephemeral port)
    pub port: u16,
    /// File the gossiped network map is persisted to
    pub network_map_path: PathBuf,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            network_map_path: PathBuf::from("live_network_nodes.json"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// - `SOK_HOST`, `SOK_PORT`, `SOK_NETWORK_MAP`, `SOK_MAX_BODY_BYTES`
    ///
    /// Unparsable numeric values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup("SOK_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("SOK_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("SOK_PORT is not a port: {port}")))?;
        }
        if let Some(path) = lookup("SOK_NETWORK_MAP") {
            config.network_map_path = PathBuf::from(path);
        }
        if let Some(limit) = lookup("SOK_MAX_BODY_BYTES") {
            config.max_body_bytes = limit.trim().parse().map_err(|_| {
                ConfigError::InvalidLimit(format!("SOK_MAX_BODY_BYTES is not a size: {limit}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host cannot be empty".into()));
        }
        if self.network_map_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("network_map_path cannot be empty".into()));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit("max_body_bytes cannot be 0".into()));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 5000);
        assert_eq!(
            config.network_map_path,
            PathBuf::from("live_network_nodes.json")
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("SOK_HOST", "127.0.0.1"),
            ("SOK_PORT", "5123"),
            ("SOK_NETWORK_MAP", "/tmp/nodes.json"),
            ("SOK_MAX_BODY_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5123);
        assert_eq!(config.network_map_path, PathBuf::from("/tmp/nodes.json"));
        assert_eq!(config.max_body_bytes, 1024);
    }

    #[test]
    fn test_bad_env_values_are_errors() {
        assert!(GatewayConfig::from_lookup(lookup(&[("SOK_PORT", "http")])).is_err());
        assert!(matches!(
            GatewayConfig::from_lookup(lookup(&[("SOK_MAX_BODY_BYTES", "0")])),
            Err(ConfigError::InvalidLimit(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GatewayConfig = serde_json::from_str(r#"{"port": 6000}"#).unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_empty_host_rejected() {
        let config = GatewayConfig {
            host: " ".into(),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
