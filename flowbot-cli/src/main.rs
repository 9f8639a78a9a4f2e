//! `flowbot`: chat with a FlowBot knowledge base from the terminal.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! export PINECONE_API_KEY=pc-...
//! flowbot                       # interactive, streamed answers
//! flowbot ask "How many vacation days do I get?" --no-stream
//! ```

mod cli;
mod console;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use flowbot_telemetry::{TelemetryConfig, init_telemetry};
use tracing::info;

use cli::{Cli, Command};
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    init_telemetry(&TelemetryConfig::default().format(cli.log_format))?;

    let settings = Settings::from_env()?;
    info!(?settings, "starting flowbot");
    let orchestrator = settings.orchestrator()?;
    let stream = !cli.no_stream;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => console::run_console(orchestrator, stream).await,
        Command::Ask { question } => console::ask(&orchestrator, &question, stream).await,
    }
}
