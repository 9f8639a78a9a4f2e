//! Interactive and one-shot front ends.

use std::io::Write;

use anyhow::Result;
use flowbot_chat::{ChatOrchestrator, ConversationTurn};
use futures::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

const PROMPT: &str = "You -> ";

/// Print one answer and return its full text.
async fn answer(
    orchestrator: &ChatOrchestrator,
    history: &[ConversationTurn],
    question: &str,
    stream: bool,
    out: &mut impl Write,
) -> Result<String> {
    let text = if stream {
        let mut chunks = Box::pin(orchestrator.process_chat(history, question));
        let mut text = String::new();
        while let Some(chunk) = chunks.next().await {
            write!(out, "{chunk}")?;
            out.flush()?;
            text.push_str(&chunk);
        }
        text
    } else {
        let text = orchestrator.chat(history, question).await;
        write!(out, "{text}")?;
        text
    };
    writeln!(out)?;
    Ok(text)
}

/// Answer `question` once and exit.
pub async fn ask(orchestrator: &ChatOrchestrator, question: &str, stream: bool) -> Result<()> {
    answer(orchestrator, &[], question, stream, &mut std::io::stdout()).await?;
    Ok(())
}

/// Run a read-eval loop, keeping the conversation history between turns.
pub async fn run_console(orchestrator: ChatOrchestrator, stream: bool) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut history: Vec<ConversationTurn> = Vec::new();
    let name = orchestrator.config().assistant_name.clone();

    println!("{name} (type 'exit' to quit)\n");

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        if let Err(e) = rl.add_history_entry(question) {
            warn!(error = %e, "failed to record line history");
        }

        print!("\n{name} -> ");
        let mut stdout = std::io::stdout();
        let reply = answer(&orchestrator, &history, question, stream, &mut stdout).await?;
        println!();

        history.push(ConversationTurn::user(question));
        history.push(ConversationTurn::assistant(reply));
    }

    Ok(())
}
