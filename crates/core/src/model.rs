//! Domain types shared by the cache layers, the orchestrator and the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::{country_cache_key, normalize, normalize_location};

/// Whether the caller has searched with us before.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    New,
    #[default]
    Returning,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::New => "new",
            UserType::Returning => "returning",
        }
    }
}

/// Who is asking, as far as the cache policy cares.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Option<String>,
    pub user_type: UserType,
    /// When this user last searched; drives the stale-history priority bonus.
    pub last_search_at: Option<DateTime<Utc>>,
}

impl UserContext {
    pub fn new_user() -> Self {
        Self { user_type: UserType::New, ..Default::default() }
    }

    pub fn returning(last_search_at: Option<DateTime<Utc>>) -> Self {
        Self { user_type: UserType::Returning, last_search_at, ..Default::default() }
    }
}

/// Caller-supplied search parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub keywords: String,
    pub location: String,
    /// 0 starts a new search; later pages are fetched one at a time. Page 0
    /// shows API page 1, so page 1 repeats page 0's first slice.
    pub page: u32,
    /// Falls back to the configured country when absent.
    pub country: Option<String>,
}

impl SearchParams {
    pub fn new(keywords: impl Into<String>, location: impl Into<String>, page: u32) -> Self {
        Self { keywords: keywords.into(), location: location.into(), page, country: None }
    }
}

/// A single normalized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw_keywords: String,
    pub raw_location: String,
    pub normalized_keywords: String,
    pub normalized_location: String,
    pub page: u32,
    pub country: String,
}

impl SearchQuery {
    pub fn new(keywords: &str, location: &str, page: u32, country: &str) -> Self {
        Self {
            raw_keywords: keywords.trim().to_string(),
            raw_location: location.trim().to_string(),
            normalized_keywords: normalize(keywords),
            normalized_location: normalize_location(location),
            page,
            country: country.trim().to_lowercase(),
        }
    }

    pub fn cache_key(&self) -> String {
        self.page_key(self.page)
    }

    /// Key for another page of the same search.
    pub fn page_key(&self, page: u32) -> String {
        country_cache_key(&self.country, &self.normalized_keywords, &self.normalized_location, page)
    }

    pub fn is_new_search(&self) -> bool {
        self.page == 0
    }
}

/// Salary bounds plus the display string shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub display: String,
}

/// A parsed job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: SalaryRange,
    pub description_snippet: String,
    pub url: Option<String>,
    pub posted_date: Option<DateTime<Utc>>,
    pub posted_label: String,
    pub source: String,
    pub contract_type: Option<String>,
    pub category: Option<String>,
}

/// Jobs persisted for one cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cache_key: String,
    pub jobs: Vec<JobPosting>,
    pub fetched_at: DateTime<Utc>,
    pub total_results: u64,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.fetched_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Click,
    View,
    Save,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Click => "click",
            InteractionKind::View => "view",
            InteractionKind::Save => "save",
        }
    }
}

/// Append-only record of a user acting on a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub job_id: String,
    pub kind: InteractionKind,
    pub user: UserContext,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
