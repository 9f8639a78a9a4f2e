//! Conversation messages, tool definitions and model responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier pairing this call with its result.
    pub call_id: String,
    /// Name of the function to invoke.
    pub name: String,
    /// Raw JSON argument string exactly as produced by the model.
    pub arguments: String,
}

/// One entry of the message list sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Instructions framing the conversation.
    System(String),
    /// A user utterance.
    User(String),
    /// An earlier assistant answer.
    Assistant(String),
    /// A function call previously requested by the model.
    ToolCall(ToolCall),
    /// The output produced for the call with the same `call_id`.
    ToolResult {
        /// Identifier of the call this output answers.
        call_id: String,
        /// Text produced by the tool.
        output: String,
    },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// Create a tool result for `call_id`.
    pub fn tool_result(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::ToolResult { call_id: call_id.into(), output: output.into() }
    }
}

/// A function the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name.
    pub name: String,
    /// What the function does, as shown to the model.
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
    /// Whether the service must enforce the schema exactly.
    pub strict: bool,
}

/// Input to one model invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// The conversation so far.
    pub messages: Vec<Message>,
    /// Functions offered for this invocation; empty disables tool calling.
    pub tools: Vec<ToolDefinition>,
}

impl ChatRequest {
    /// Create a request offering `tools`.
    pub fn new(messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Self {
        Self { messages, tools }
    }

    /// Create a request with tool calling disabled.
    pub fn without_tools(messages: Vec<Message>) -> Self {
        Self { messages, tools: Vec::new() }
    }
}

/// One item of a non-streaming model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    /// Assistant text.
    Text(String),
    /// A requested function call.
    ToolCall(ToolCall),
    /// An item kind the core does not act on (e.g. reasoning).
    Other(String),
}

/// A complete, non-streaming model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    /// Output items in the order the model produced them.
    pub output: Vec<OutputItem>,
}

impl ModelResponse {
    /// A response holding a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self { output: vec![OutputItem::Text(text.into())] }
    }

    /// A response holding a single function call.
    pub fn tool_call(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            output: vec![OutputItem::ToolCall(ToolCall {
                call_id: call_id.into(),
                name: name.into(),
                arguments: arguments.into(),
            })],
        }
    }

    /// Concatenated text of all text items.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The first function call in the output, if any.
    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.output.iter().find_map(|item| match item {
            OutputItem::ToolCall(call) => Some(call),
            _ => None,
        })
    }
}

/// One event of a streaming model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An increment of output text.
    TextDelta(String),
    /// A new content part started; may already carry text.
    ContentPartAdded {
        /// Text carried by the part, if it is a text part.
        text: Option<String>,
    },
    /// The response finished.
    Completed,
    /// The service reported a failure inside the stream.
    Failed(String),
    /// Any other event type, kept by name.
    Other(String),
}

impl StreamEvent {
    /// Text this event contributes to the answer, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::TextDelta(delta) if !delta.is_empty() => Some(delta),
            Self::ContentPartAdded { text: Some(text) } if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}
