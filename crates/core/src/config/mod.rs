//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from multiple sources:
//!
//! 1. Environment variables (JOB_CACHE_*)
//! 2. TOML config file (if JOB_CACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Cache-policy thresholds live in [`PolicyConfig`], nested under `policy`
//! (e.g. `JOB_CACHE_POLICY__BASE_TTL_HOURS=12`).

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Job API application id.
    ///
    /// Set via JOB_CACHE_APP_ID environment variable.
    #[serde(default)]
    pub app_id: Option<String>,

    /// Job API application key.
    ///
    /// Set via JOB_CACHE_APP_KEY environment variable.
    #[serde(default)]
    pub app_key: Option<String>,

    /// Base URL of the job API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Two-letter country code used when the caller gives none.
    #[serde(default = "default_country")]
    pub country: String,

    /// Jobs per external page and per response page.
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,

    /// Per-call timeout for the job API in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Path to the primary SQLite store.
    #[serde(default = "default_primary_db_path")]
    pub primary_db_path: PathBuf,

    /// Path to the secondary SQLite store.
    #[serde(default = "default_secondary_db_path")]
    pub secondary_db_path: PathBuf,

    /// External calls allowed per calendar day.
    #[serde(default = "default_daily_budget")]
    pub daily_budget: u32,

    /// Lifetime of quick-cache entries in seconds.
    #[serde(default = "default_quick_cache_ttl_secs")]
    pub quick_cache_ttl_secs: u64,

    /// Maximum number of quick-cache entries.
    #[serde(default = "default_quick_cache_capacity")]
    pub quick_cache_capacity: u64,

    /// Age in hours after which persisted entries are removed by cleanup.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: i64,

    /// Cache-policy thresholds.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// A `[start_hour, end_hour)` window of local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl PeakWindow {
    pub const fn new(start_hour: u32, end_hour: u32) -> Self {
        Self { start_hour, end_hour }
    }

    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Thresholds used by the cache-policy engine and the fetch orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub base_ttl_hours: i64,
    pub popular_title_ttl_hours: i64,
    pub stable_location_ttl_hours: i64,
    pub fast_industry_ttl_hours: i64,
    pub stable_industry_ttl_hours: i64,

    /// Usage ratio at which cache lifetimes are stretched.
    pub warning_ratio: f64,
    pub extend_multiplier: i32,
    /// Multiplier for the last-resort lookup once the budget is spent.
    pub extended_lookup_multiplier: i32,

    /// Scores strictly above this are high priority.
    pub high_priority_threshold: u8,
    /// Cached entries older than this may be bypassed for high-priority peak requests.
    pub bypass_min_age_minutes: i64,
    /// Bypass only happens while usage is below this ratio.
    pub bypass_max_usage_ratio: f64,
    pub stale_search_hours: i64,

    pub peak_windows: Vec<PeakWindow>,

    pub default_pages: u32,
    pub peak_pages: u32,
    /// Peak requests above this usage ratio fetch `peak_pages`.
    pub peak_pages_usage_ratio: f64,
    pub low_usage_pages: u32,
    /// Requests below this usage ratio fetch `low_usage_pages`.
    pub low_usage_ratio: f64,

    pub page_delay_ms: u64,
    pub peak_page_delay_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            base_ttl_hours: 24,
            popular_title_ttl_hours: 48,
            stable_location_ttl_hours: 24 * 7,
            fast_industry_ttl_hours: 12,
            stable_industry_ttl_hours: 72,
            warning_ratio: 0.8,
            extend_multiplier: 2,
            extended_lookup_multiplier: 3,
            high_priority_threshold: 70,
            bypass_min_age_minutes: 60,
            bypass_max_usage_ratio: 0.5,
            stale_search_hours: 24,
            peak_windows: vec![PeakWindow::new(8, 10), PeakWindow::new(12, 14), PeakWindow::new(17, 19)],
            default_pages: 5,
            peak_pages: 3,
            peak_pages_usage_ratio: 0.6,
            low_usage_pages: 7,
            low_usage_ratio: 0.3,
            page_delay_ms: 500,
            peak_page_delay_ms: 1500,
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.adzuna.com/v1/api".into()
}

fn default_country() -> String {
    "gb".into()
}

fn default_results_per_page() -> u32 {
    10
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "job-cache/0.1".into()
}

fn default_primary_db_path() -> PathBuf {
    PathBuf::from("./job-cache-primary.sqlite")
}

fn default_secondary_db_path() -> PathBuf {
    PathBuf::from("./job-cache-secondary.sqlite")
}

fn default_daily_budget() -> u32 {
    1000
}

fn default_quick_cache_ttl_secs() -> u64 {
    300
}

fn default_quick_cache_capacity() -> u64 {
    1000
}

fn default_retention_hours() -> i64 {
    24 * 7 * 3
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_key: None,
            api_base_url: default_api_base_url(),
            country: default_country(),
            results_per_page: default_results_per_page(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            primary_db_path: default_primary_db_path(),
            secondary_db_path: default_secondary_db_path(),
            daily_budget: default_daily_budget(),
            quick_cache_ttl_secs: default_quick_cache_ttl_secs(),
            quick_cache_capacity: default_quick_cache_capacity(),
            retention_hours: default_retention_hours(),
            policy: PolicyConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn quick_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.quick_cache_ttl_secs)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::hours(self.retention_hours)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `JOB_CACHE_`
    /// 2. TOML file from `JOB_CACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("JOB_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("JOB_CACHE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Return the API credentials, or a hint on how to set them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if either credential is not set.
    pub fn require_api_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let app_id = self.app_id.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "app_id".into(),
            hint: "Set JOB_CACHE_APP_ID environment variable".into(),
        })?;
        let app_key = self.app_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "app_key".into(),
            hint: "Set JOB_CACHE_APP_KEY environment variable".into(),
        })?;
        Ok((app_id, app_key))
    }
}
