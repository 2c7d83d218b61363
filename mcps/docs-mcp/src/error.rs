//! Error types for the documentation pipeline
//!
//! Every stage (search, fetch, cleanup) reports failures through [`DocsError`].
//! The MCP layer converts them with [`DocsError::into_mcp_error`].

use rmcp::ErrorData as McpError;
use thiserror::Error;

use crate::config::ConfigError;

/// Network stage that produced a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    Fetch,
    Cleanup,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Search => "search",
            Stage::Fetch => "fetch",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while answering a documentation query
#[derive(Error, Debug)]
pub enum DocsError {
    /// The requested library has no entry in the directory
    #[error("Library {library} not supported by this tool (supported: {})", .supported.join(", "))]
    UnsupportedLibrary {
        library: String,
        supported: Vec<String>,
    },

    /// The search provider answered with a non-success status
    #[error("search provider error {status}: {body}")]
    SearchProvider { status: u16, body: String },

    /// Transport failure or non-success status while fetching a page
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The hosted cleanup model call failed
    #[error("cleanup model error: {0}")]
    CleanupModel(String),

    /// A network call exceeded its configured bound
    #[error("{stage} request timed out after {seconds}s")]
    Timeout { stage: Stage, seconds: u64 },

    /// Configuration is missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every result link failed to fetch or clean
    #[error("all sources failed: {}", format_failures(.0))]
    AllSourcesFailed(Vec<SourceFailure>),
}

/// A result link whose fetch-and-clean failed
#[derive(Debug)]
pub struct SourceFailure {
    pub link: String,
    pub error: DocsError,
}

fn format_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.link, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for pipeline operations
pub type DocsResult<T> = Result<T, DocsError>;

impl DocsError {
    /// Convert into the error payload returned to the MCP client
    ///
    /// Unsupported libraries are caller mistakes and map to `invalid_params`;
    /// everything else is an internal failure.
    pub fn into_mcp_error(self) -> McpError {
        match &self {
            DocsError::UnsupportedLibrary { .. } => McpError::invalid_params(self.to_string(), None),
            _ => McpError::internal_error(self.to_string(), None),
        }
    }

    /// Returns true if this error is a timeout in any stage
    ///
    /// `AllSourcesFailed` counts as a timeout only when every link timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            DocsError::Timeout { .. } => true,
            DocsError::AllSourcesFailed(failures) => {
                !failures.is_empty() && failures.iter().all(|f| f.error.is_timeout())
            }
            _ => false,
        }
    }
}

impl From<DocsError> for McpError {
    fn from(err: DocsError) -> Self {
        err.into_mcp_error()
    }
}
