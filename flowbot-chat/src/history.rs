//! Caller-owned conversation history.

use serde::{Deserialize, Serialize};

use flowbot_model::Message;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person chatting.
    User,
    /// The chatbot.
    Assistant,
}

/// One past utterance of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Speaker of this turn.
    pub role: Role,
    /// What was said.
    pub content: String,
}

impl ConversationTurn {
    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub(crate) fn to_message(&self) -> Message {
        match self.role {
            Role::User => Message::user(self.content.as_str()),
            Role::Assistant => Message::assistant(self.content.as_str()),
        }
    }
}

/// The most recent `max_turns` turns, oldest first.
pub fn history_window(history: &[ConversationTurn], max_turns: usize) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(max_turns)..]
}
