//! Conversion between FlowBot types and Responses API JSON.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ModelError, Result};
use crate::message::{
    ChatRequest, Message, ModelResponse, OutputItem, StreamEvent, ToolCall, ToolDefinition,
};

/// Convert a message into a Responses API input item.
pub(crate) fn message_to_input(message: &Message) -> Value {
    match message {
        Message::System(content) => json!({ "role": "system", "content": content }),
        Message::User(content) => json!({ "role": "user", "content": content }),
        Message::Assistant(content) => json!({ "role": "assistant", "content": content }),
        Message::ToolCall(call) => json!({
            "type": "function_call",
            "call_id": call.call_id,
            "name": call.name,
            "arguments": call.arguments,
        }),
        Message::ToolResult { call_id, output } => json!({
            "type": "function_call_output",
            "call_id": call_id,
            "output": output,
        }),
    }
}

fn tool_to_json(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.parameters,
        "strict": tool.strict,
    })
}

/// Build the request body for `POST /responses`.
pub(crate) fn request_body(model: &str, request: &ChatRequest, stream: bool) -> Value {
    let mut body = json!({
        "model": model,
        "input": request.messages.iter().map(message_to_input).collect::<Vec<_>>(),
    });
    if !request.tools.is_empty() {
        body["tools"] = Value::Array(request.tools.iter().map(tool_to_json).collect());
    }
    if stream {
        body["stream"] = Value::Bool(true);
    }
    body
}

// ── Response decoding ──────────────────────────────────────────────

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    output: Vec<RawOutputItem>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawOutputItem {
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Vec<RawContent>,
    },
    #[serde(rename = "function_call")]
    FunctionCall { call_id: String, name: String, arguments: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawContent {
    #[serde(rename = "output_text")]
    OutputText { text: String },
    #[serde(other)]
    Other,
}

/// Decode a full Responses API body.
pub(crate) fn parse_response(body: Value) -> Result<ModelResponse> {
    let raw: RawResponse =
        serde_json::from_value(body).map_err(|e| ModelError::Decode(e.to_string()))?;

    let mut output = Vec::new();
    for item in raw.output {
        match item {
            RawOutputItem::Message { content } => {
                for part in content {
                    if let RawContent::OutputText { text } = part {
                        output.push(OutputItem::Text(text));
                    }
                }
            }
            RawOutputItem::FunctionCall { call_id, name, arguments } => {
                output.push(OutputItem::ToolCall(ToolCall { call_id, name, arguments }));
            }
            RawOutputItem::Other => output.push(OutputItem::Other("unsupported".into())),
        }
    }
    Ok(ModelResponse { output })
}

/// Decode the `data` payload of one server-sent event.
///
/// Returns `None` for payloads that carry no event (the `[DONE]` marker).
pub(crate) fn parse_event(data: &str) -> Result<Option<StreamEvent>> {
    if data.trim() == "[DONE]" {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(data).map_err(|e| ModelError::Decode(e.to_string()))?;
    let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();

    let event = match kind {
        "response.output_text.delta" => StreamEvent::TextDelta(
            value.get("delta").and_then(Value::as_str).unwrap_or_default().to_string(),
        ),
        "response.content_part.added" => {
            let part = value.get("part");
            let is_text = part
                .and_then(|p| p.get("type"))
                .and_then(Value::as_str)
                .is_some_and(|t| t == "output_text" || t == "text");
            let text = if is_text {
                part.and_then(|p| p.get("text")).and_then(Value::as_str).map(str::to_string)
            } else {
                None
            };
            StreamEvent::ContentPartAdded { text }
        }
        "response.completed" => StreamEvent::Completed,
        "response.failed" => StreamEvent::Failed(
            value
                .pointer("/response/error/message")
                .and_then(Value::as_str)
                .unwrap_or("response failed")
                .to_string(),
        ),
        "error" => StreamEvent::Failed(
            value.get("message").and_then(Value::as_str).unwrap_or("unknown error").to_string(),
        ),
        other => StreamEvent::Other(other.to_string()),
    };
    Ok(Some(event))
}
