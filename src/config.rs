//! # Configuration
//!
//! Application configuration loading and management.
//!
//! # Configuration Sources
//!
//! Configuration is loaded in the following order (later sources override
//! earlier):
//! 1. Default values
//! 2. Configuration file (if exists)
//! 3. Environment variables (prefixed with `SWAP_ROUTER_`)
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SWAP_ROUTER_CONFIG_FILE` | Config file path | `config.toml` |
//! | `SWAP_ROUTER_LOG_LEVEL` | Log level | `info` |
//! | `SWAP_ROUTER_LOG_FORMAT` | Log format (json/pretty) | `json` |
//! | `SWAP_ROUTER_PLATFORM_FEE_PM` | Platform fee in per-mille | `3` |
//! | `SWAP_ROUTER_ENVIRONMENT` | Deployment environment | `development` |
//!
//! # Examples
//!
//! ```ignore
//! use swap_router::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("venues configured: {}", config.venues.len());
//! ```

use crate::application::services::circuit_breaker::CircuitBreakerConfig;
use crate::application::services::resilience::ResilienceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse configuration.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (structured logging).
    #[default]
    Json,
    /// Pretty format (human-readable).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Json,
        }
    }
}

// ============================================================================
// Resilience Configuration
// ============================================================================

/// Resilience defaults applied to every venue, overridable per entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceSettings {
    /// Hard per-call timeout in milliseconds.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Consecutive failures that trip a venue's circuit.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Initial recovery timeout in milliseconds.
    #[serde(default = "default_recovery_timeout_ms")]
    pub recovery_timeout_ms: u64,

    /// Cap on the grown recovery timeout in milliseconds.
    #[serde(default = "default_max_recovery_timeout_ms")]
    pub max_recovery_timeout_ms: u64,

    /// Growth factor applied when a trial call fails.
    #[serde(default = "default_backoff_multiplier")]
    pub recovery_backoff_multiplier: f64,

    /// Quiet seconds after which a success resets the failure count.
    #[serde(default = "default_failure_decay_secs")]
    pub failure_decay_secs: u64,

    /// Outbound requests allowed per venue per minute.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// Maximum retry attempts for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry backoff delay in milliseconds.
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            failure_threshold: default_failure_threshold(),
            recovery_timeout_ms: default_recovery_timeout_ms(),
            max_recovery_timeout_ms: default_max_recovery_timeout_ms(),
            recovery_backoff_multiplier: default_backoff_multiplier(),
            failure_decay_secs: default_failure_decay_secs(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            max_retries: default_max_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
        }
    }
}

impl ResilienceSettings {
    /// Produces the wrapper configuration for a venue, honoring its
    /// per-entry overrides.
    #[must_use]
    pub fn to_resilience_config(&self, entry: &VenueEntry) -> ResilienceConfig {
        ResilienceConfig {
            call_timeout: Duration::from_millis(entry.timeout_ms.unwrap_or(self.call_timeout_ms)),
            breaker: CircuitBreakerConfig {
                failure_threshold: self.failure_threshold,
                recovery_timeout: Duration::from_millis(
                    entry.recovery_timeout_ms.unwrap_or(self.recovery_timeout_ms),
                ),
                max_recovery_timeout: Duration::from_millis(self.max_recovery_timeout_ms),
                backoff_multiplier: self.recovery_backoff_multiplier,
                failure_decay_after: Duration::from_secs(self.failure_decay_secs),
            },
            rate_limit: entry
                .rate_limit_per_minute
                .unwrap_or(self.rate_limit_per_minute),
            rate_limit_window: Duration::from_secs(60),
            max_retries: self.max_retries,
            retry_initial_delay: Duration::from_millis(self.retry_initial_delay_ms),
        }
    }
}

// ============================================================================
// Venue Configuration
// ============================================================================

/// Which adapter implementation serves a venue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    /// 0x swap API.
    ZeroX,
    /// 1inch aggregation API.
    OneInch,
    /// ParaSwap API.
    ParaSwap,
}

/// One configured venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueEntry {
    /// Venue identifier.
    pub id: String,

    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,

    /// Adapter implementation.
    pub kind: VenueKind,

    /// Venue fee in per-mille.
    #[serde(default)]
    pub fee_pm: u32,

    /// Supported chain IDs.
    pub chains: Vec<u64>,

    /// Whether the venue participates in aggregation.
    #[serde(default = "default_true")]
    pub active: bool,

    /// API key, where the venue requires one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override (testing, self-hosted gateways).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Nominal gas estimate when the venue reports none.
    #[serde(default = "default_nominal_gas")]
    pub nominal_gas: u64,

    /// Wallet address enabling firm transaction building.
    #[serde(default)]
    pub wallet_address: Option<String>,

    /// Per-venue call timeout override in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Per-venue recovery timeout override in milliseconds.
    #[serde(default)]
    pub recovery_timeout_ms: Option<u64>,

    /// Per-venue rate limit override.
    #[serde(default)]
    pub rate_limit_per_minute: Option<u32>,
}

/// One seeded price reference entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Base symbol (e.g. `"ETH"`).
    pub base: String,
    /// Quote symbol (e.g. `"USDC"`).
    pub quote: String,
    /// Price of one base in quote units.
    pub price: f64,
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service name for tracing.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Environment (development, staging, production).
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Platform fee in per-mille, applied to every quote's net output.
    #[serde(default = "default_platform_fee_pm")]
    pub platform_fee_pm: u32,

    /// Execution freshness window in seconds.
    #[serde(default = "default_freshness_window_secs")]
    pub freshness_window_secs: u64,

    /// Cap applied to caller deadlines, in milliseconds.
    #[serde(default = "default_max_deadline_ms")]
    pub max_deadline_ms: u64,

    /// How long quotes stay addressable for execution, in seconds.
    #[serde(default = "default_quote_retention_secs")]
    pub quote_retention_secs: u64,

    /// Resilience defaults.
    #[serde(default)]
    pub resilience: ResilienceSettings,

    /// Configured venues.
    #[serde(default)]
    pub venues: Vec<VenueEntry>,

    /// Seeded price reference entries.
    #[serde(default)]
    pub prices: Vec<PriceEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            log: LogConfig::default(),
            platform_fee_pm: default_platform_fee_pm(),
            freshness_window_secs: default_freshness_window_secs(),
            max_deadline_ms: default_max_deadline_ms(),
            quote_retention_secs: default_quote_retention_secs(),
            resilience: ResilienceSettings::default(),
            venues: Vec::new(),
            prices: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables and optional config
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let config_path = std::env::var("SWAP_ROUTER_CONFIG_FILE")
            .unwrap_or_else(|_| "config.toml".to_string());
        if Path::new(&config_path).exists() {
            config = Self::from_file(&config_path)?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("SWAP_ROUTER_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Ok(format) = std::env::var("SWAP_ROUTER_LOG_FORMAT") {
            self.log.format = match format.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                _ => LogFormat::Json,
            };
        }
        if let Ok(fee) = std::env::var("SWAP_ROUTER_PLATFORM_FEE_PM") {
            if let Ok(parsed) = fee.parse() {
                self.platform_fee_pm = parsed;
            }
        }
        if let Ok(name) = std::env::var("SWAP_ROUTER_SERVICE_NAME") {
            self.service_name = name;
        }
        if let Ok(env) = std::env::var("SWAP_ROUTER_ENVIRONMENT") {
            self.environment = env;
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".to_string(),
                message: format!(
                    "invalid log level '{}', must be one of: {:?}",
                    self.log.level, valid_levels
                ),
            });
        }

        if self.platform_fee_pm >= 1_000 {
            return Err(ConfigError::InvalidValue {
                field: "platform_fee_pm".to_string(),
                message: format!("{} is not below 1000", self.platform_fee_pm),
            });
        }

        for entry in &self.venues {
            if entry.chains.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("venues.{}.chains", entry.id),
                    message: "at least one chain is required".to_string(),
                });
            }
            if entry.fee_pm >= 1_000 {
                return Err(ConfigError::InvalidValue {
                    field: format!("venues.{}.fee_pm", entry.id),
                    message: format!("{} is not below 1000", entry.fee_pm),
                });
            }
        }

        for price in &self.prices {
            if !price.price.is_finite() || price.price < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("prices.{}/{}", price.base, price.quote),
                    message: format!("{} is not a valid price", price.price),
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "swap-router".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_platform_fee_pm() -> u32 {
    3
}

fn default_freshness_window_secs() -> u64 {
    600
}

fn default_max_deadline_ms() -> u64 {
    10_000
}

fn default_quote_retention_secs() -> u64 {
    3_600
}

fn default_call_timeout_ms() -> u64 {
    2_500
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_recovery_timeout_ms() -> u64 {
    30_000
}

fn default_max_recovery_timeout_ms() -> u64 {
    300_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_failure_decay_secs() -> u64 {
    60
}

fn default_rate_limit_per_minute() -> u32 {
    300
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_initial_delay_ms() -> u64 {
    100
}

fn default_nominal_gas() -> u64 {
    200_000
}
