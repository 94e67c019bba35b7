//! job_search tool implementation.
//!
//! Serves a job search through the cache tiers, spending API budget only
//! when nothing cached will do.

use chrono::{DateTime, Utc};
use jobcache_core::{Error, JobSearchService, SearchParams, UserContext, UserType};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for job_search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct JobSearchParams {
    /// Search keywords, e.g. a job title (required).
    pub keywords: String,

    /// Location filter.
    #[serde(default)]
    pub location: String,

    /// 0 starts a new search and pre-fetches several pages; 1+ fetches that page.
    #[serde(default)]
    pub page: u32,

    /// Two-letter country code; defaults to the configured country.
    #[serde(default)]
    pub country: Option<String>,

    /// Caller identifier, for logging only.
    #[serde(default)]
    pub user_id: Option<String>,

    /// "new" or "returning" (default).
    #[serde(default)]
    pub user_type: UserType,

    /// RFC 3339 time of the user's previous search.
    #[serde(default)]
    pub last_search_at: Option<String>,
}

impl JobSearchParams {
    fn user(&self) -> Result<UserContext, Error> {
        let last_search_at = self
            .last_search_at
            .as_deref()
            .map(|s| {
                DateTime::parse_from_rfc3339(s)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| Error::InvalidInput(format!("invalid last_search_at: {e}")))
            })
            .transpose()?;

        Ok(UserContext { user_id: self.user_id.clone(), user_type: self.user_type, last_search_at })
    }
}

/// Implementation of the job_search tool.
pub async fn search_impl(service: &JobSearchService, params: JobSearchParams) -> Result<CallToolResult, McpError> {
    if params.keywords.trim().is_empty() {
        return Err(Error::InvalidInput("keywords cannot be empty".into()).into());
    }

    let user = params.user()?;
    let search = SearchParams {
        keywords: params.keywords,
        location: params.location,
        page: params.page,
        country: params.country,
    };

    let response = service.search(search, &user).await?;
    json_result(&response)
}
