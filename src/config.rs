//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::client::ClientConfig;
use crate::view::{PlotArea, DEFAULT_INTERVAL_DAYS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub appliances: AppliancesConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dashboard API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unset keeps the HTTP client's own default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Dashboard polling settings
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
}

fn default_refresh_interval() -> u64 {
    15
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
        }
    }
}

impl RefreshConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Appliance screen settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppliancesConfig {
    /// Interval the schedule toggle applies
    #[serde(default = "default_interval_days")]
    pub default_interval_days: u32,
}

fn default_interval_days() -> u32 {
    DEFAULT_INTERVAL_DAYS
}

impl Default for AppliancesConfig {
    fn default() -> Self {
        Self {
            default_interval_days: default_interval_days(),
        }
    }
}

/// Sparkline plot area
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_extent")]
    pub width: f64,

    #[serde(default = "default_chart_extent")]
    pub height: f64,
}

fn default_chart_extent() -> f64 {
    100.0
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_extent(),
            height: default_chart_extent(),
        }
    }
}

impl ChartConfig {
    pub fn plot_area(&self) -> PlotArea {
        PlotArea {
            width: self.width,
            height: self.height,
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

        config.validate()?;
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
            dirs::config_dir().map(|p| p.join("home-dashboard").join("config.toml")),
            Some(PathBuf::from("/etc/home-dashboard/config.toml")),
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

    /// Explicit path if given, otherwise the default search
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("HOME_DASHBOARD_API_BASE") {
            self.api.base_url = url;
        }
        if let Some(secs) = var("HOME_DASHBOARD_REFRESH_SECS") {
            match secs.parse() {
                Ok(secs) if secs > 0 => self.refresh.interval_secs = secs,
                _ => tracing::warn!("Ignoring invalid HOME_DASHBOARD_REFRESH_SECS={}", secs),
            }
        }
        if let Some(level) = var("HOME_DASHBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("HOME_DASHBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::Invalid("refresh.interval_secs must be at least 1".into()));
        }
        if self.appliances.default_interval_days == 0 {
            return Err(ConfigError::Invalid(
                "appliances.default_interval_days must be at least 1".into(),
            ));
        }
        if !(self.chart.width > 0.0 && self.chart.height > 0.0) {
            return Err(ConfigError::Invalid("chart width and height must be positive".into()));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Home Dashboard Configuration
#
# Environment variables override these settings:
# - HOME_DASHBOARD_API_BASE
# - HOME_DASHBOARD_REFRESH_SECS
# - HOME_DASHBOARD_LOG_LEVEL
# - HOME_DASHBOARD_LOG_FORMAT

[api]
# Base URL of the dashboard API server
base_url = "http://127.0.0.1:8000"

# Request timeout in seconds (unset: no client-side timeout)
# request_timeout_secs = 30

[refresh]
# How often the dashboard is reloaded (seconds)
interval_secs = 15

[appliances]
# Interval applied by the schedule toggle (days)
default_interval_days = 7

[chart]
# Sparkline plot area
width = 100.0
height = 100.0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
