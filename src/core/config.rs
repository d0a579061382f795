//! Configuration for the colored de Bruijn graph core.
//!
//! Mirrors this codebase's convention of a `serde`-derived, file-loadable,
//! sensibly-defaulted `Config` struct. There is no network or CLI surface here,
//! so this is smaller than a server `Config` would be: just the knobs the
//! hash table, path arena, and logging need before a `Graph` is constructed.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hash table sizing defaults.
    pub hash: HashConfig,
    /// Path arena sizing defaults.
    pub paths: PathConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Hash table sizing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashConfig {
    /// Default capacity (in k-mers) used when a driver doesn't size the table
    /// itself from a graph file header.
    pub default_capacity_kmers: usize,
}

/// Path arena sizing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Default arena size in bytes used when a driver doesn't size the path
    /// store itself from a `.ctp` header.
    pub default_arena_bytes: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"info"` or `"cortex_graph=debug"`.
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash: HashConfig::default(),
            paths: PathConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            default_capacity_kmers: 1 << 20,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            default_arena_bytes: 64 << 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

/// Load configuration from a file, falling back to defaults if `path` is `None`
/// or the file can't be read/parsed.
pub fn load_config_or_default(path: Option<&str>) -> Config {
    match path {
        Some(path) => match load_config(path) {
            Ok(config) => {
                tracing::info!("loaded configuration from {path}");
                config
            }
            Err(e) => {
                tracing::warn!("failed to load config from {path}: {e}. Using defaults.");
                Config::default()
            }
        },
        None => {
            tracing::debug!("no config file specified, using defaults");
            Config::default()
        }
    }
}
