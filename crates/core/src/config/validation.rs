//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, PolicyConfig};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for the first field that is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daily_budget == 0 {
            return Err(invalid("daily_budget", "must be greater than 0"));
        }

        if !(1..=50).contains(&self.results_per_page) {
            return Err(invalid("results_per_page", "must be between 1 and 50"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.country.len() != 2 || !self.country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid("country", "must be a two-letter country code"));
        }

        if self.quick_cache_ttl_secs == 0 {
            return Err(invalid("quick_cache_ttl_secs", "must be greater than 0"));
        }

        if self.retention_hours <= 0 {
            return Err(invalid("retention_hours", "must be greater than 0"));
        }

        if self.primary_db_path == self.secondary_db_path {
            tracing::warn!(
                path = %self.primary_db_path.display(),
                "primary and secondary stores share one database file; redundancy is lost"
            );
        }

        self.policy.validate()
    }
}

impl PolicyConfig {
    /// Validate policy thresholds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending `policy.*` field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ttls = [
            ("policy.base_ttl_hours", self.base_ttl_hours),
            ("policy.popular_title_ttl_hours", self.popular_title_ttl_hours),
            ("policy.stable_location_ttl_hours", self.stable_location_ttl_hours),
            ("policy.fast_industry_ttl_hours", self.fast_industry_ttl_hours),
            ("policy.stable_industry_ttl_hours", self.stable_industry_ttl_hours),
        ];
        for (field, hours) in ttls {
            if hours <= 0 {
                return Err(invalid(field, "must be greater than 0"));
            }
        }

        let ratios = [
            ("policy.warning_ratio", self.warning_ratio),
            ("policy.bypass_max_usage_ratio", self.bypass_max_usage_ratio),
            ("policy.peak_pages_usage_ratio", self.peak_pages_usage_ratio),
            ("policy.low_usage_ratio", self.low_usage_ratio),
        ];
        for (field, ratio) in ratios {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(invalid(field, "must be between 0.0 and 1.0"));
            }
        }

        if self.extend_multiplier < 1 {
            return Err(invalid("policy.extend_multiplier", "must be at least 1"));
        }
        if self.extended_lookup_multiplier < self.extend_multiplier {
            return Err(invalid("policy.extended_lookup_multiplier", "must not be below extend_multiplier"));
        }

        if self.high_priority_threshold > 100 {
            return Err(invalid("policy.high_priority_threshold", "must not exceed 100"));
        }

        for window in &self.peak_windows {
            if window.start_hour >= window.end_hour || window.end_hour > 24 {
                return Err(invalid("policy.peak_windows", "each window needs start_hour < end_hour <= 24"));
            }
        }

        if self.default_pages == 0 || self.peak_pages == 0 || self.low_usage_pages == 0 {
            return Err(invalid("policy.*_pages", "page counts must be greater than 0"));
        }

        Ok(())
    }
}
