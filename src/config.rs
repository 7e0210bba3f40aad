use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::pool::default_proximity_workers;
use crate::core::proximity::{DEFAULT_ATTRACTION_PROXIMITY_RANGE_MILES, DEFAULT_PROXIMITY_BUFFER_MILES};

/// Application configuration
///
/// Every section has defaults, so an empty configuration is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub proximity: ProximitySettings,
    #[serde(default)]
    pub pools: PoolSettings,
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub providers: ProviderSettings,
    #[serde(default)]
    pub internal: InternalSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProximitySettings {
    /// Reward eligibility radius in miles
    #[serde(default = "default_buffer_miles")]
    pub buffer_miles: f64,
    /// Radius of the general "is near" predicate in miles
    #[serde(default = "default_attraction_range_miles")]
    pub attraction_range_miles: f64,
    #[serde(default = "default_nearby_limit")]
    pub nearby_limit: usize,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            buffer_miles: default_buffer_miles(),
            attraction_range_miles: default_attraction_range_miles(),
            nearby_limit: default_nearby_limit(),
        }
    }
}

fn default_buffer_miles() -> f64 { DEFAULT_PROXIMITY_BUFFER_MILES }
fn default_attraction_range_miles() -> f64 { DEFAULT_ATTRACTION_PROXIMITY_RANGE_MILES }
fn default_nearby_limit() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct PoolSettings {
    #[serde(default = "default_proximity_workers")]
    pub proximity_workers: usize,
    #[serde(default = "default_scoring_workers")]
    pub scoring_workers: usize,
    /// Upper bound on concurrent location refreshes during a tracker poll
    #[serde(default = "default_tracking_concurrency")]
    pub tracking_concurrency: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            proximity_workers: default_proximity_workers(),
            scoring_workers: default_scoring_workers(),
            tracking_concurrency: default_tracking_concurrency(),
        }
    }
}

fn default_scoring_workers() -> usize { 64 }
fn default_tracking_concurrency() -> usize { 256 }

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl TrackerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn default_true() -> bool { true }
fn default_poll_interval_secs() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// GpsUtil base URL; the simulated provider is used when unset
    pub gps_url: Option<String>,
    /// RewardCentral base URL; the simulated provider is used when unset
    pub reward_central_url: Option<String>,
    /// Per-call timeout for remote fetch and score calls
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            gps_url: None,
            reward_central_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ProviderSettings {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 { 5000 }

#[derive(Debug, Clone, Deserialize)]
pub struct InternalSettings {
    /// Number of generated users seeded at startup
    #[serde(default = "default_user_count")]
    pub user_count: usize,
    #[serde(default = "default_trip_pricer_api_key")]
    pub trip_pricer_api_key: String,
}

impl Default for InternalSettings {
    fn default() -> Self {
        Self {
            user_count: default_user_count(),
            trip_pricer_api_key: default_trip_pricer_api_key(),
        }
    }
}

fn default_user_count() -> usize { 100 }
fn default_trip_pricer_api_key() -> String { "test-server-api-key".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TOURGUIDE)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TOURGUIDE__TRACKER__POLL_INTERVAL_SECS -> tracker.poll_interval_secs
            .add_source(
                Environment::with_prefix("TOURGUIDE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("TOURGUIDE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
