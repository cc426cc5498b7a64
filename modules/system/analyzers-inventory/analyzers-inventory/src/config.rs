//! Configuration for the analyzers inventory module.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment prefix for overrides, e.g. `ANALYZERS_INVENTORY__NODE_TIMEOUT=2s`.
pub const ENV_PREFIX: &str = "ANALYZERS_INVENTORY__";

/// Analyzers inventory module configuration.
///
/// Durations are humantime strings and need a unit suffix (`"5s"`,
/// `"250ms"`). A bare number such as `ANALYZERS_INVENTORY__NODE_TIMEOUT=5`
/// is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzersInventoryConfig {
    /// Budget for a single node to answer.
    #[serde(default = "default_node_timeout", with = "humantime_serde")]
    pub node_timeout: Duration,

    /// Deadline for the whole scatter/gather request.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Node replies above this size are rejected without decoding.
    #[serde(default = "default_max_wire_payload_bytes")]
    pub max_wire_payload_bytes: usize,
}

fn default_node_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_wire_payload_bytes() -> usize {
    16 * 1024 * 1024
}

impl Default for AnalyzersInventoryConfig {
    fn default() -> Self {
        Self {
            node_timeout: default_node_timeout(),
            request_timeout: default_request_timeout(),
            max_wire_payload_bytes: default_max_wire_payload_bytes(),
        }
    }
}

/// Configuration error for typed config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid analyzers inventory config: {0}")]
    Invalid(String),

    #[error("malformed analyzers inventory config: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl AnalyzersInventoryConfig {
    /// Reads the config from a host-provided module section
    /// (`{ "config": { ... } }`).
    ///
    /// A missing module, a non-object module value or a missing `config`
    /// field all yield the defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` if the `config` section exists but cannot be
    /// deserialized or fails validation.
    pub fn from_module_value(module: Option<&serde_json::Value>) -> Result<Self, ConfigError> {
        let Some(section) = module
            .and_then(serde_json::Value::as_object)
            .and_then(|obj| obj.get("config"))
        else {
            return Ok(Self::default());
        };

        let config: Self = serde_json::from_value(section.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads defaults, then the optional YAML file, then `ANALYZERS_INVENTORY__*`
    /// environment overrides.
    ///
    /// # Errors
    /// Returns an error if a provider yields invalid values or the merged
    /// config fails validation.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let config: Self = figment
            .extract()
            .context("failed to load analyzers inventory config")?;
        config.validate()?;

        tracing::debug!(
            node_timeout = ?config.node_timeout,
            request_timeout = ?config.request_timeout,
            "Loaded analyzers inventory config"
        );
        Ok(config)
    }

    /// A `node_timeout` above `request_timeout` is accepted; the request
    /// deadline then bounds every node.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if a timeout or the payload limit is
    /// zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_owned()));
        }
        if self.max_wire_payload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_wire_payload_bytes must be non-zero".to_owned(),
            ));
        }
        Ok(())
    }
}
