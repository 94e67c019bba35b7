//! The external job API as seen by the orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::SearchQuery;

/// One page of raw results. Records are parsed individually so a malformed
/// record never spoils the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawJobPage {
    /// Total matches reported by the API across all pages.
    pub count: u64,
    pub records: Vec<serde_json::Value>,
}

/// Why an external call failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("request timeout")]
    Timeout,

    #[error("rate limited: too many requests")]
    RateLimited,

    #[error("authentication failed")]
    Auth,

    #[error("HTTP error: {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// A paged, billed job-search API. Every call costs one unit of budget.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch one API page (1-based) for the query.
    async fn fetch_page(&self, query: &SearchQuery, page: u32, per_page: u32) -> Result<RawJobPage, SourceError>;
}

impl std::fmt::Debug for dyn JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("JobSource").field(&self.name()).finish()
    }
}
