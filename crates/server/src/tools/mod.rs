//! MCP tool implementations.
//!
//! This module contains all tools exposed by the job-cache server. Each tool
//! only converts parameters and serializes results; the decisions live in
//! [`jobcache_core::JobSearchService`].

pub mod cache;
pub mod job_search;
pub mod track_click;
pub mod usage;

pub use job_search::JobSearchParams;
pub use track_click::TrackClickParams;

use jobcache_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::Serialization(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
