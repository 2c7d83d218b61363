//! Docs MCP Server
//!
//! Searches official library documentation and returns cleaned page text.
//!
//! # Configuration
//! Set `SERPER_API_KEY` and `GROQ_API_KEY` (a `.env` file is honored), or
//! configure in `<config_dir>/docs-mcp/config.toml`

use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};

use docs_mcp::cli::{Cli, Commands};
use docs_mcp::telemetry::{init_tracing, LogFormat};
use docs_mcp::{Config, DocsMcpServer, DocsPipeline, LibraryDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, LogFormat::from_env())?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.resolved_command() {
        Commands::Libraries => {
            let directory = LibraryDirectory::new(config.libraries);
            for entry in directory.entries() {
                println!("{}\t{}", entry.library, entry.domain);
            }
            Ok(())
        }
        Commands::GetDocs {
            library,
            query,
            num_results,
        } => {
            config.validate()?;
            let pipeline = DocsPipeline::from_config(&config)?;
            let text = pipeline
                .get_docs_with_limit(&query, &library, num_results)
                .await?;
            println!("{}", text);
            Ok(())
        }
        Commands::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Docs MCP Server");

    config.validate()?;

    let server = DocsMcpServer::from_config(&config)?;
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
