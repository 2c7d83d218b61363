//! Docs MCP Library
//!
//! Documentation search for AI agents: a query and a library name become a
//! site-restricted web search, the top result pages are fetched and cleaned to
//! readable text, and the pages are returned labeled with their source links.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use docs_mcp::{Config, DocsPipeline};
//!
//! let config = Config::load(None)?;
//! config.validate()?;
//! let pipeline = DocsPipeline::from_config(&config)?;
//! let text = pipeline.get_docs("Publish a package with UV", "uv").await?;
//! ```
//!
//! # Configuration
//! Set `SERPER_API_KEY` and `GROQ_API_KEY`, or configure in
//! `<config_dir>/docs-mcp/config.toml`

pub mod clean;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod llm;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod telemetry;

// Re-export main types
pub use config::{CleanupStrategy, Config, ConfigError};
pub use directory::LibraryDirectory;
pub use error::{DocsError, DocsResult};
pub use pipeline::{DocsPipeline, NO_RESULTS};
pub use server::{DocsMcpServer, GetDocsParams};
