//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::{
    JobSearchParams, TrackClickParams, cache,
    job_search::search_impl,
    track_click::track_click_impl,
    usage::usage_impl,
};

use jobcache_core::JobSearchService;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for job-cache.
#[derive(Clone)]
pub struct JobCacheServer {
    service: JobSearchService,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl JobCacheServer {
    /// Create a new server handler around a configured search service.
    pub fn new(service: JobSearchService) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Search job listings. Serves from cache when possible and spends API budget only on misses. page 0 starts a new search."
    )]
    async fn job_search(&self, params: Parameters<JobSearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.service, params.0).await
    }

    #[tool(description = "Record that a user clicked a job. Returns immediately; the write happens in the background.")]
    async fn track_click(&self, params: Parameters<TrackClickParams>) -> Result<CallToolResult, McpError> {
        track_click_impl(&self.service, params.0)
    }

    #[tool(description = "Report today's external API usage against the daily budget.")]
    async fn usage_stats(&self) -> Result<CallToolResult, McpError> {
        usage_impl(&self.service)
    }

    #[tool(description = "Delete cached search results older than the retention window from both stores.")]
    async fn cache_cleanup(&self) -> Result<CallToolResult, McpError> {
        cache::cleanup_impl(&self.service).await
    }

    #[tool(description = "Clear the short-lived in-memory cache of recent responses.")]
    async fn clear_quick_cache(&self) -> Result<CallToolResult, McpError> {
        cache::clear_impl(&self.service)
    }
}

impl ServerHandler for JobCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "job-cache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
