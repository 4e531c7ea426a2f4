//! Application configuration management.

use chrono::NaiveTime;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Currency conversion configuration.
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Daily sweep schedule configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Currency conversion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// Base currency all aggregates are stored in.
    #[serde(default = "default_base_currency")]
    pub base: String,
    /// URL of the exchange-rate provider's latest-rates endpoint.
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
    /// How long a fetched rate table stays valid, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Timeout for provider requests, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base: default_base_currency(),
            provider_url: default_provider_url(),
            cache_ttl_secs: default_cache_ttl(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_currency() -> String {
    "VND".to_string()
}

fn default_provider_url() -> String {
    "https://open.er-api.com/v6/latest/USD".to_string()
}

fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

fn default_request_timeout() -> u64 {
    10
}

/// Times of day (UTC) at which the daily sweeps run.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Budget alert defense-in-depth sweep.
    #[serde(default = "default_budget_check")]
    pub budget_check: NaiveTime,
    /// Recurring transaction generation sweep.
    #[serde(default = "default_recurring_generation")]
    pub recurring_generation: NaiveTime,
    /// Goal expiry scan.
    #[serde(default = "default_goal_expiry")]
    pub goal_expiry: NaiveTime,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            budget_check: default_budget_check(),
            recurring_generation: default_recurring_generation(),
            goal_expiry: default_goal_expiry(),
        }
    }
}

fn default_budget_check() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 30, 0).unwrap_or(NaiveTime::MIN)
}

fn default_recurring_generation() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_goal_expiry() -> NaiveTime {
    NaiveTime::MIN
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FINTRA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
