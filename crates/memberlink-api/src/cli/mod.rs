//! CLI definitions for the `mlink` binary.

use clap::{Parser, Subcommand};

/// Member directory API with a chat relay bot.
#[derive(Parser)]
#[command(name = "mlink", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server (and the chat relay when configured).
    Serve {
        /// Port to listen on [default: from config.toml, else 4000].
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to [default: from config.toml, else 127.0.0.1].
        #[arg(long)]
        host: Option<String>,

        /// Do not start the chat relay even if a bot token is set.
        #[arg(long)]
        no_relay: bool,
    },

    /// Run only the chat relay bot.
    Relay,
}
