//! cache_cleanup tool implementation.
//!
//! Deletes persisted entries older than the retention window from both stores.

use jobcache_core::JobSearchService;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_cleanup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheCleanupOutput {
    /// Entries deleted across both stores.
    pub deleted: u64,
}

/// Implementation of the cache_cleanup tool.
pub async fn cleanup_impl(service: &JobSearchService) -> Result<CallToolResult, McpError> {
    let deleted = service.cleanup_expired().await;
    json_result(&CacheCleanupOutput { deleted })
}
