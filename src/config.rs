//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database bootstrap configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Primary endpoint; when unset the connector goes straight to the
    /// ephemeral fallback
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_connect_timeout() -> u64 {
    3000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: None,
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

/// Dashboard page behavior
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    /// Divisor applied to a counter target to get the per-tick increment
    #[serde(default = "default_counter_speed")]
    pub counter_speed: f64,

    #[serde(default = "default_counter_tick")]
    pub counter_tick_ms: u64,

    #[serde(default = "default_analyze_delay")]
    pub analyze_delay_ms: u64,

    #[serde(default = "default_chemical_name")]
    pub default_chemical_name: String,

    /// Drop a pending analysis completion when the form is reset
    #[serde(default = "default_cancel_stale")]
    pub cancel_stale_analysis: bool,
}

fn default_counter_speed() -> f64 {
    200.0
}

fn default_counter_tick() -> u64 {
    15
}

fn default_analyze_delay() -> u64 {
    1800
}

fn default_chemical_name() -> String {
    "Unknown Chemical".to_string()
}

fn default_cancel_stale() -> bool {
    true
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            counter_speed: default_counter_speed(),
            counter_tick_ms: default_counter_tick(),
            analyze_delay_ms: default_analyze_delay(),
            default_chemical_name: default_chemical_name(),
            cancel_stale_analysis: default_cancel_stale(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("chemdash").join("config.toml")),
            Some(PathBuf::from("/etc/chemdash/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Unparseable numeric values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Database overrides
        // MONGODB_URI is read for deployments that only set the legacy name
        if let Some(uri) = lookup("CHEMDASH_DATABASE_URI").or_else(|| lookup("MONGODB_URI")) {
            self.database.uri = if uri.trim().is_empty() { None } else { Some(uri) };
        }
        if let Some(timeout) = lookup("CHEMDASH_CONNECT_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse() {
                self.database.connect_timeout_ms = t;
            }
        }

        // Dashboard overrides
        if let Some(delay) = lookup("CHEMDASH_ANALYZE_DELAY_MS") {
            if let Ok(d) = delay.parse() {
                self.dashboard.analyze_delay_ms = d;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("CHEMDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CHEMDASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# ChemDash Configuration
#
# Environment variables override these settings:
# - CHEMDASH_DATABASE_URI (MONGODB_URI is accepted when unset)
# - CHEMDASH_CONNECT_TIMEOUT_MS
# - CHEMDASH_ANALYZE_DELAY_MS
# - CHEMDASH_LOG_LEVEL
# - CHEMDASH_LOG_FORMAT

[database]
# Primary database endpoint. When it is unset or unreachable an ephemeral
# in-memory instance is started instead (data resets on restart).
# uri = "mongodb://127.0.0.1:27017/chemdash"

# How long to wait for the primary endpoint (ms)
connect_timeout_ms = 3000

[dashboard]
# Counter increment is target / counter_speed; larger is slower
counter_speed = 200.0

# Delay between counter ticks (ms)
counter_tick_ms = 15

# Simulated analysis time (ms)
analyze_delay_ms = 1800

# Name shown when the chemical name field is left blank
default_chemical_name = "Unknown Chemical"

# Drop a pending analysis result when the form is reset
cancel_stale_analysis = true

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
