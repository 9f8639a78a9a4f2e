//! Orchestrator configuration.

use crate::error::{ChatError, Result};
use crate::prompt::DEFAULT_ASSISTANT_NAME;

/// Maximum number of retrieval rounds before an answer is forced.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// Number of past turns sent to the model (eight exchanges).
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 16;

/// Vector index name shown in the tool description.
pub const DEFAULT_INDEX_NAME: &str = "flowbot-kb";

/// Configuration for a [`ChatOrchestrator`](crate::ChatOrchestrator).
///
/// Retrieval limits belong to the pipeline's
/// [`RetrievalConfig`](flowbot_rag::RetrievalConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Name used in the system prompt.
    pub assistant_name: String,
    /// Index name shown in the tool description.
    pub index_name: String,
    /// Retrieval rounds allowed before finalization is forced.
    pub max_tool_rounds: usize,
    /// Past turns included in each request.
    pub max_history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            max_history_turns: DEFAULT_MAX_HISTORY_TURNS,
        }
    }
}

impl ChatConfig {
    /// Create a new [`ChatConfigBuilder`].
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_tool_rounds == 0 {
            return Err(ChatError::Config("max_tool_rounds must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`ChatConfig`].
#[derive(Debug, Default)]
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl ChatConfigBuilder {
    /// Set the assistant name.
    pub fn assistant_name(mut self, name: impl Into<String>) -> Self {
        self.config.assistant_name = name.into();
        self
    }

    /// Set the index name shown in the tool description.
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = name.into();
        self
    }

    /// Set the retrieval round bound.
    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.config.max_tool_rounds = rounds;
        self
    }

    /// Set the history window.
    pub fn max_history_turns(mut self, turns: usize) -> Self {
        self.config.max_history_turns = turns;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if `max_tool_rounds == 0`.
    pub fn build(self) -> Result<ChatConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
