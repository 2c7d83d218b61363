//! CLI argument definitions

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docs-mcp")]
#[command(about = "Documentation search MCP server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a TOML config file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v debug, -vv trace). Default is info.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the MCP tools over stdio (default)
    Serve,
    /// Run one documentation query and print the result
    GetDocs {
        /// Library identifier (see `libraries`)
        library: String,
        /// Free-text query
        query: String,
        /// Number of result pages to fetch
        #[arg(long, short)]
        num_results: Option<usize>,
    },
    /// List supported libraries and their documentation domains
    Libraries,
}

impl Cli {
    /// The subcommand to run; serving is the default
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
