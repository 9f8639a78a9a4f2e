//! # flowbot-model
//!
//! Chat-completion model integrations for FlowBot.
//!
//! ## Overview
//!
//! - [`ChatModel`] - the trait the orchestrator drives: one non-streaming
//!   `complete` call or one streaming `stream` call per invocation.
//! - [`OpenAIClient`] - OpenAI Responses API (`gpt-4.1`, `gpt-4.1-mini`, ...)
//!   and compatible services.
//! - [`MockChatModel`] - scripted model for testing.
//!
//! Messages follow the Responses API item model: plain role messages plus
//! `function_call` / `function_call_output` pairs linked by `call_id`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowbot_model::openai::{OpenAIClient, OpenAIConfig};
//! use flowbot_model::{ChatModel, ChatRequest, Message};
//!
//! let model = OpenAIClient::new(OpenAIConfig::new(api_key, "gpt-4.1"))?;
//! let response = model
//!     .complete(&ChatRequest::without_tools(vec![Message::user("Hello")]))
//!     .await?;
//! println!("{}", response.output_text());
//! ```

pub mod error;
pub mod message;
pub mod mock;
pub mod model;
#[cfg(feature = "openai")]
pub mod openai;

pub use error::{ModelError, Result};
pub use message::{
    ChatRequest, Message, ModelResponse, OutputItem, StreamEvent, ToolCall, ToolDefinition,
};
pub use mock::{MockChatModel, MockStream};
pub use model::{ChatModel, EventStream};
#[cfg(feature = "openai")]
pub use openai::OpenAIClient;
