//! CLI module for ragrelay.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// ragrelay - streaming retrieval-augmented answers
///
/// Runs the relay server that retrieves context, streams LLM answers and
/// caches them, and talks to a running relay from the terminal.
#[derive(Parser, Debug)]
#[command(name = "ragrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question through a running relay
    Ask {
        /// The question to ask
        query: String,

        /// Wait for the whole answer instead of streaming it
        #[arg(long)]
        no_stream: bool,

        /// Relay base URL (defaults to client.base_url)
        #[arg(short, long, env = "RAGRELAY_URL")]
        url: Option<String>,
    },

    /// Start an interactive chat session against a running relay
    Chat {
        /// Relay base URL (defaults to client.base_url)
        #[arg(short, long, env = "RAGRELAY_URL")]
        url: Option<String>,
    },

    /// Check configuration and required secrets
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}
