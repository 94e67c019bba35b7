//! usage_stats tool implementation.

use jobcache_core::JobSearchService;
use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::json_result;

/// Report today's API usage against the daily budget.
pub fn usage_impl(service: &JobSearchService) -> Result<CallToolResult, McpError> {
    json_result(&service.usage_stats())
}
