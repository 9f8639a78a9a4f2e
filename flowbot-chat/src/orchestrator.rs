//! Retrieval-augmented tool-calling loop.
//!
//! Every invocation runs the same planning loop: the model is called
//! without streaming and offered `retrieve_knowledge`. While it asks for the
//! tool, the call and its result are appended to the conversation and the
//! model is asked again, up to `max_tool_rounds` times. The answer is then
//! produced by [`ChatOrchestrator::chat`] as one string or by
//! [`ChatOrchestrator::process_chat`] as a stream of text chunks.
//!
//! Neither entry point returns an error. Model failures become a single
//! apology text that names the error.

use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::{Instrument, debug, error, info, info_span, warn};

use flowbot_model::{ChatModel, ChatRequest, Message, ModelError, StreamEvent, ToolCall};
use flowbot_rag::{RETRIEVE_KNOWLEDGE, RetrievalPipeline, RetrieveKnowledgeArgs};

use crate::config::ChatConfig;
use crate::error::Result;
use crate::history::{ConversationTurn, history_window};
use crate::prompt::{retrieve_knowledge_tool, system_prompt};

/// Answer used when the model produced no text at all.
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I couldn't generate a response. Please try again.";

/// Prefix of the answer used when the model could not be reached.
pub const ERROR_RESPONSE_PREFIX: &str =
    "I'm sorry, an error occurred while processing your request:";

fn error_response(error: &ModelError) -> String {
    format!("{ERROR_RESPONSE_PREFIX} {error}")
}

fn or_fallback(text: String) -> String {
    if text.trim().is_empty() { FALLBACK_RESPONSE.to_string() } else { text }
}

/// How the planning loop ended.
#[derive(Debug)]
enum Plan {
    /// The model answered without asking for the tool.
    Direct(String),
    /// The round bound was reached.
    Forced,
}

/// Drives a [`ChatModel`] through retrieval rounds against a
/// [`RetrievalPipeline`].
///
/// Holds no per-conversation state; clones share the same clients.
#[derive(Clone)]
pub struct ChatOrchestrator {
    model: Arc<dyn ChatModel>,
    pipeline: Arc<RetrievalPipeline>,
    config: ChatConfig,
}

impl ChatOrchestrator {
    /// Create an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`](crate::ChatError::Config) if `config`
    /// is inconsistent.
    pub fn new(
        model: Arc<dyn ChatModel>,
        pipeline: Arc<RetrievalPipeline>,
        config: ChatConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, pipeline, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Answer `query` in one piece.
    pub async fn chat(&self, history: &[ConversationTurn], query: &str) -> String {
        let span = info_span!("chat", mode = "batch", history_turns = history.len());
        async move {
            let mut messages = self.initial_messages(history, query);
            match self.answer(&mut messages).await {
                Ok(text) => or_fallback(text),
                Err(e) => {
                    error!(error = %e, "chat failed");
                    error_response(&e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Answer `query` as a stream of text chunks.
    ///
    /// The stream ends after the answer, or after a single error chunk if the
    /// model fails. Dropping it early releases the underlying response.
    pub fn process_chat(
        &self,
        history: &[ConversationTurn],
        query: &str,
    ) -> impl Stream<Item = String> + Send + 'static {
        let this = self.clone();
        let mut messages = self.initial_messages(history, query);
        let span = info_span!("chat", mode = "stream", history_turns = history.len());

        stream! {
            if let Err(e) = this.plan(&mut messages).instrument(span.clone()).await {
                span.in_scope(|| error!(error = %e, "planning failed"));
                yield error_response(&e);
                return;
            }

            let request = ChatRequest::without_tools(messages);
            let mut events = match this.model.stream(&request).instrument(span.clone()).await {
                Ok(events) => events,
                Err(e) => {
                    span.in_scope(|| error!(error = %e, "failed to open response stream"));
                    yield error_response(&e);
                    return;
                }
            };

            let mut streamed = false;
            while let Some(event) = events.next().instrument(span.clone()).await {
                let event = match event {
                    Ok(StreamEvent::Failed(message)) => Err(ModelError::Stream(message)),
                    other => other,
                };
                match event {
                    Ok(event) => {
                        if let Some(text) = event.text() {
                            streamed = true;
                            yield text.to_string();
                        }
                    }
                    Err(e) => {
                        span.in_scope(|| error!(error = %e, "error in streaming response"));
                        yield error_response(&e);
                        return;
                    }
                }
            }

            if !streamed {
                span.in_scope(|| warn!("no content streamed, requesting full response"));
                match this.model.complete(&request).instrument(span.clone()).await {
                    Ok(response) => yield or_fallback(response.output_text()),
                    Err(e) => {
                        span.in_scope(|| error!(error = %e, "fallback completion failed"));
                        yield error_response(&e);
                    }
                }
            }
        }
    }

    /// System prompt, windowed history, then the new query.
    fn initial_messages(&self, history: &[ConversationTurn], query: &str) -> Vec<Message> {
        let window = history_window(history, self.config.max_history_turns);
        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(Message::system(system_prompt(&self.config.assistant_name)));
        messages.extend(window.iter().map(ConversationTurn::to_message));
        messages.push(Message::user(query));
        messages
    }

    async fn answer(&self, messages: &mut Vec<Message>) -> std::result::Result<String, ModelError> {
        match self.plan(messages).await? {
            Plan::Direct(text) => Ok(text),
            Plan::Forced => {
                let request = ChatRequest::without_tools(messages.clone());
                Ok(self.model.complete(&request).await?.output_text())
            }
        }
    }

    /// Run planning calls until the model stops asking for retrieval or the
    /// round bound is reached. Every tool call appended to `messages` is
    /// immediately followed by its result.
    async fn plan(&self, messages: &mut Vec<Message>) -> std::result::Result<Plan, ModelError> {
        let tools = vec![retrieve_knowledge_tool(&self.config.index_name)];
        let mut round = 0;

        loop {
            let request = ChatRequest::new(messages.clone(), tools.clone());
            let response = self.model.complete(&request).await?;

            let call = match response.first_tool_call() {
                Some(call) if call.name == RETRIEVE_KNOWLEDGE => call.clone(),
                Some(call) => {
                    warn!(
                        name = %call.name,
                        call_id = %call.call_id,
                        "ignoring call to unknown tool"
                    );
                    return Ok(Plan::Direct(response.output_text()));
                }
                None => {
                    debug!(round, "model answered directly");
                    return Ok(Plan::Direct(response.output_text()));
                }
            };

            round += 1;
            let output = self.execute_tool(&call, round).await;
            let call_id = call.call_id.clone();
            messages.push(Message::ToolCall(call));
            messages.push(Message::tool_result(call_id, output));

            if round >= self.config.max_tool_rounds {
                info!(round, "tool round limit reached, forcing final answer");
                return Ok(Plan::Forced);
            }
        }
    }

    async fn execute_tool(&self, call: &ToolCall, round: usize) -> String {
        match RetrieveKnowledgeArgs::parse(&call.arguments) {
            Ok(args) => {
                info!(
                    round,
                    call_id = %call.call_id,
                    query = %args.query,
                    "executing knowledge retrieval"
                );
                self.pipeline.search_default(&args.query).await.into_text()
            }
            Err(e) => {
                warn!(round, call_id = %call.call_id, error = %e, "invalid tool arguments");
                format!("Invalid arguments for {RETRIEVE_KNOWLEDGE}: {e}")
            }
        }
    }
}

impl std::fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("model", &self.model.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
