//! Configuration types for Abacus.
//!
//! `AbacusConfig` mirrors `abacus.toml`. Every section and field has a
//! default so an empty or missing file yields a working setup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbacusConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub public: PublicConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AbacusConfig {
    /// Check values serde cannot express as types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logger.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if let Some(id) = self
            .public
            .local_only
            .iter()
            .find(|id| self.public.allowed.contains(id))
        {
            return Err(ConfigError::AllowListConflict(id.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Execution logger ring buffer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    1000
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Allow-list for the untrusted execute path.
///
/// `allowed` ids may be executed by public callers. `local_only` ids exist
/// but are reserved for trusted surfaces and are answered with "forbidden"
/// rather than "not found".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicConfig {
    #[serde(default = "default_allowed")]
    pub allowed: Vec<String>,
    #[serde(default = "default_local_only")]
    pub local_only: Vec<String>,
}

fn default_allowed() -> Vec<String> {
    [
        "tax.calculate",
        "salary.analyze",
        "capital.growth",
        "mortgage.calculate",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_local_only() -> Vec<String> {
    vec!["tax.optimize".to_string()]
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self {
            allowed: default_allowed(),
            local_only: default_local_only(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Diagnostic tracing output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Also export spans through the OpenTelemetry stdout exporter.
    #[serde(default)]
    pub otel: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            otel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("logger capacity must be at least 1")]
    ZeroCapacity,

    #[error("server host must not be empty")]
    EmptyHost,

    #[error("skill '{0}' is listed in both public.allowed and public.local_only")]
    AllowListConflict(String),
}
