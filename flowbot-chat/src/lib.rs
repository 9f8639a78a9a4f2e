//! # flowbot-chat
//!
//! Retrieval-augmented chat for FlowBot chatbots.
//!
//! A [`ChatOrchestrator`] answers a question given the caller's conversation
//! history. It lets the model call `retrieve_knowledge` against a
//! [`RetrievalPipeline`](flowbot_rag::RetrievalPipeline) a bounded number of
//! times, then returns the answer in one piece ([`ChatOrchestrator::chat`])
//! or streams it ([`ChatOrchestrator::process_chat`]).
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use flowbot_chat::{ChatConfig, ChatOrchestrator, ConversationTurn};
//!
//! let orchestrator = ChatOrchestrator::new(model, pipeline, ChatConfig::default())?;
//! let history = vec![ConversationTurn::user("Hi"), ConversationTurn::assistant("Hello!")];
//!
//! let mut answer = orchestrator.process_chat(&history, "How many vacation days do I get?");
//! while let Some(chunk) = answer.next().await {
//!     print!("{chunk}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod prompt;

pub use config::{
    ChatConfig, ChatConfigBuilder, DEFAULT_INDEX_NAME, DEFAULT_MAX_HISTORY_TURNS,
    DEFAULT_MAX_TOOL_ROUNDS,
};
pub use error::{ChatError, Result};
pub use history::{ConversationTurn, Role, history_window};
pub use orchestrator::{ChatOrchestrator, ERROR_RESPONSE_PREFIX, FALLBACK_RESPONSE};
pub use prompt::{DEFAULT_ASSISTANT_NAME, retrieve_knowledge_tool, system_prompt};
