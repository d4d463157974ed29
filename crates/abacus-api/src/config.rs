//! Configuration loader for the `abacus` binary.
//!
//! Reads `abacus.toml` and deserializes it into [`AbacusConfig`]. Falls back
//! to defaults when the file is missing, malformed, or fails validation.

use std::path::{Path, PathBuf};

use abacus_types::config::AbacusConfig;

pub const CONFIG_ENV: &str = "ABACUS_CONFIG";
pub const HOST_ENV: &str = "ABACUS_HOST";
pub const PORT_ENV: &str = "ABACUS_PORT";

const CONFIG_DIR: &str = ".abacus";
const CONFIG_FILE: &str = "abacus.toml";

/// Pick the config file path.
///
/// Priority: the `--config` flag, then `ABACUS_CONFIG`, then
/// `~/.abacus/abacus.toml`.
pub fn resolve_config_path(flag: Option<&Path>, env: Option<PathBuf>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or(env)
        .or_else(|| dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE)))
}

/// Load configuration from `path`.
///
/// - Missing file: defaults.
/// - Unreadable, unparseable, or invalid file: a warning and defaults.
pub fn load_config(path: &Path) -> AbacusConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return AbacusConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AbacusConfig::default();
        }
    };

    let config = match toml::from_str::<AbacusConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            return AbacusConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => config,
        Err(err) => {
            tracing::warn!("Invalid config in {}: {err}, using defaults", path.display());
            AbacusConfig::default()
        }
    }
}

/// Apply `ABACUS_HOST` / `ABACUS_PORT` values on top of the file config.
pub fn apply_env_overrides(config: &mut AbacusConfig, host: Option<String>, port: Option<String>) {
    if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
        config.server.host = host;
    }
    if let Some(port) = port {
        match port.parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(err) => tracing::warn!("Ignoring {PORT_ENV}={port}: {err}"),
        }
    }
}

/// Resolve, load, and override in one step, reading the environment.
pub fn load_from_env(flag: Option<&Path>) -> AbacusConfig {
    let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let mut config = match resolve_config_path(flag, env_path) {
        Some(path) => load_config(&path),
        None => {
            tracing::debug!("No home directory, using default config");
            AbacusConfig::default()
        }
    };
    apply_env_overrides(
        &mut config,
        std::env::var(HOST_ENV).ok(),
        std::env::var(PORT_ENV).ok(),
    );
    config
}
