//! MCP Server implementation for documentation search
//!
//! Exposes the `get_docs` tool (site-scoped search, fetch and cleanup of the
//! top results) and `list_libraries` (the supported library directory).

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::DocsPipeline;

/// The main Docs MCP Server
#[derive(Clone)]
pub struct DocsMcpServer {
    pipeline: Arc<DocsPipeline>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetDocsParams {
    /// What to look for in the docs
    #[schemars(description = "The query to search for (e.g. \"Publish a package with UV\")")]
    pub query: String,
    /// Library identifier from the directory
    #[schemars(description = "The library to search in (e.g. \"uv\"). See list_libraries.")]
    pub library: String,
    /// Number of result pages to fetch
    #[schemars(description = "Number of result pages to fetch (default: 2, max: 10)")]
    pub num_results: Option<usize>,
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl DocsMcpServer {
    pub fn new(pipeline: DocsPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            tool_router: Self::tool_router(),
        }
    }

    /// Build the production server from a validated configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pipeline = DocsPipeline::from_config(config)?;
        tracing::info!(
            "Search backend: {}, cleanup: {}, libraries: {}",
            pipeline.search_backend_name(),
            pipeline.cleaner_name(),
            pipeline.directory().libraries().join(", ")
        );
        Ok(Self::new(pipeline))
    }

    #[tool(
        description = "Search the latest official docs for a given query and library. \
                       Returns cleaned page text, each page prefixed with its SOURCE link."
    )]
    async fn get_docs(
        &self,
        Parameters(params): Parameters<GetDocsParams>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .pipeline
            .get_docs_with_limit(&params.query, &params.library, params.num_results)
            .await
            .map_err(|e| {
                tracing::warn!("get_docs failed: {}", e);
                e.into_mcp_error()
            })?;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "List the libraries supported by get_docs and their documentation domains.")]
    async fn list_libraries(&self) -> Result<CallToolResult, McpError> {
        let entries = self.pipeline.directory().entries();

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for DocsMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Docs MCP Server - searches the official documentation of supported \
                 libraries and returns cleaned page text with source links. Call \
                 list_libraries to see which libraries get_docs accepts."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
