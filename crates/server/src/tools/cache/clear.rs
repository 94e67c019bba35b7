//! clear_quick_cache tool implementation.

use jobcache_core::JobSearchService;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};

/// Drop every quick-cache entry. Persistent stores are untouched.
pub fn clear_impl(service: &JobSearchService) -> Result<CallToolResult, McpError> {
    service.clear_quick_cache();
    Ok(CallToolResult::success(vec![Content::text("quick cache cleared")]))
}
