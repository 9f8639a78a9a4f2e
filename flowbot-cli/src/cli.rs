//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flowbot_telemetry::LogFormat;

/// Chat with a FlowBot knowledge base.
#[derive(Debug, Parser)]
#[command(name = "flowbot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Wait for the full answer instead of streaming it.
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Load environment variables from this file instead of `./.env`.
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start an interactive conversation (default).
    Chat,
    /// Ask a single question and exit.
    Ask {
        /// The question to answer.
        question: String,
    },
}
