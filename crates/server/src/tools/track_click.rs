//! track_click tool implementation.
//!
//! Records a click in both stores on a background task and returns at once.

use jobcache_core::{Error, JobSearchService, UserContext, UserType};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the track_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TrackClickParams {
    /// Id of the clicked job.
    pub job_id: String,

    #[serde(default)]
    pub user_id: Option<String>,

    /// "new" or "returning" (default).
    #[serde(default)]
    pub user_type: UserType,
}

/// Output from the track_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrackClickOutput {
    /// The write was queued; it is not confirmed.
    pub accepted: bool,
}

/// Implementation of the track_click tool.
pub fn track_click_impl(service: &JobSearchService, params: TrackClickParams) -> Result<CallToolResult, McpError> {
    if params.job_id.trim().is_empty() {
        return Err(Error::InvalidInput("job_id cannot be empty".into()).into());
    }

    let user = UserContext { user_id: params.user_id, user_type: params.user_type, last_search_at: None };
    service.track_click(params.job_id.trim(), &user);

    json_result(&TrackClickOutput { accepted: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output, service};

    #[tokio::test]
    async fn test_track_click_accepted() {
        let service = service(10).await;
        let params = TrackClickParams { job_id: "42".into(), ..Default::default() };

        let result = track_click_impl(&service, params).unwrap();
        assert_eq!(output(&result)["accepted"], true);
    }

    #[tokio::test]
    async fn test_empty_job_id() {
        let service = service(10).await;
        let result = track_click_impl(&service, TrackClickParams::default());
        assert!(result.is_err());
    }
}
