//! Configuration module for the sentiment tracker

use crate::utils::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Minimum allowed refresh interval, in minutes
pub const MIN_UPDATE_INTERVAL_MINUTES: u32 = 1;

/// Maximum allowed refresh interval, in minutes
pub const MAX_UPDATE_INTERVAL_MINUTES: u32 = 60;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General application settings
    #[serde(default)]
    pub app: AppConfig,

    /// Sentiment API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Indicator refresh settings
    #[serde(default)]
    pub indicator: IndicatorConfig,
}

/// Application-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Sentiment API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// URL serving the blended sentiment score
    #[serde(default = "default_sentiment_url")]
    pub sentiment_url: String,

    /// URL serving the component breakdown
    #[serde(default = "default_components_url")]
    pub components_url: String,

    /// Timeout for API requests in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Indicator refresh configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// How often to fetch new data, in minutes (min 1, max 60, recommended 15)
    #[serde(default = "default_update_interval_minutes")]
    pub update_interval_minutes: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sentiment_url() -> String {
    "http://localhost:5000/api/sentiment".to_string()
}

fn default_components_url() -> String {
    "http://localhost:5000/api/sentiment/components".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_update_interval_minutes() -> u32 {
    15
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            sentiment_url: default_sentiment_url(),
            components_url: default_components_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self { update_interval_minutes: default_update_interval_minutes() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            api: ApiConfig::default(),
            indicator: IndicatorConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Per-request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl IndicatorConfig {
    /// Update interval forced into the valid [1, 60] minute range
    pub fn clamped_interval_minutes(&self) -> u32 {
        self.update_interval_minutes
            .clamp(MIN_UPDATE_INTERVAL_MINUTES, MAX_UPDATE_INTERVAL_MINUTES)
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let raw = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), raw)?;
        Ok(())
    }

    /// Render the default configuration as TOML
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }

    /// Check URLs and ranges, reporting the first problem found
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.sentiment_url)
            .map_err(|e| Error::ConfigError(format!("invalid sentiment_url: {}", e)))?;
        Url::parse(&self.api.components_url)
            .map_err(|e| Error::ConfigError(format!("invalid components_url: {}", e)))?;

        if self.api.timeout_seconds == 0 {
            return Err(Error::ConfigError("timeout_seconds must be at least 1".to_string()));
        }

        let minutes = self.indicator.update_interval_minutes;
        if !(MIN_UPDATE_INTERVAL_MINUTES..=MAX_UPDATE_INTERVAL_MINUTES).contains(&minutes) {
            return Err(Error::ConfigError(format!(
                "update_interval_minutes must be within [{}, {}], got {}",
                MIN_UPDATE_INTERVAL_MINUTES, MAX_UPDATE_INTERVAL_MINUTES, minutes
            )));
        }

        Ok(())
    }
}
