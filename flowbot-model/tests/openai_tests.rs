//! OpenAI client tests.
//!
//! Live tests need `OPENAI_API_KEY` and are ignored by default:
//! `cargo test -p flowbot-model --test openai_tests -- --ignored`

#![cfg(feature = "openai")]

use flowbot_model::openai::{OpenAIClient, OpenAIConfig};
use flowbot_model::{ChatModel, ChatRequest, Message, ModelError, ToolDefinition};
use futures::StreamExt;
use serde_json::json;

fn _assert_chat_model<T: ChatModel>() {}

#[test]
fn client_implements_chat_model() {
    _assert_chat_model::<OpenAIClient>();
}

#[test]
fn client_rejects_empty_key() {
    let err = OpenAIClient::new(OpenAIConfig::new("", "gpt-4.1")).err().unwrap();
    assert!(matches!(err, ModelError::Config(_)));
}

#[test]
fn client_reports_model_name() {
    let client = OpenAIClient::new(OpenAIConfig::new("sk-test", "gpt-4.1-mini")).unwrap();
    assert_eq!(client.name(), "gpt-4.1-mini");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
    let client = OpenAIClient::compatible("sk-test", "http://127.0.0.1:9/v1", "gpt-4.1").unwrap();
    let request = ChatRequest::without_tools(vec![Message::user("hi")]);
    let err = client.complete(&request).await.unwrap_err();
    assert!(matches!(err, ModelError::Request(_)));
    assert!(client.stream(&request).await.is_err());
}

fn live_client() -> OpenAIClient {
    let key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
    OpenAIClient::new(OpenAIConfig::new(key, "gpt-4.1-mini")).unwrap()
}

#[tokio::test]
#[ignore = "Requires OPENAI_API_KEY"]
async fn live_tool_call_round_trip() {
    let client = live_client();
    let tool = ToolDefinition {
        name: "retrieve_knowledge".into(),
        description: "Search the knowledge base for relevant information.".into(),
        parameters: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"],
            "additionalProperties": false
        }),
        strict: true,
    };
    let mut messages = vec![
        Message::system("Always call retrieve_knowledge before answering."),
        Message::user("What is our refund policy?"),
    ];

    let response = client.complete(&ChatRequest::new(messages.clone(), vec![tool])).await.unwrap();
    let call = response.first_tool_call().expect("model should call the tool").clone();
    assert_eq!(call.name, "retrieve_knowledge");

    messages.push(Message::ToolCall(call.clone()));
    messages.push(Message::tool_result(call.call_id, "Refunds are issued within 30 days."));
    let response = client.complete(&ChatRequest::without_tools(messages)).await.unwrap();
    assert!(response.output_text().contains("30"));
}

#[tokio::test]
#[ignore = "Requires OPENAI_API_KEY"]
async fn live_stream_yields_text() {
    let client = live_client();
    let request = ChatRequest::without_tools(vec![Message::user("Say hello in one word.")]);
    let events: Vec<_> = client.stream(&request).await.unwrap().collect().await;
    let text: String = events.iter().filter_map(|e| e.as_ref().ok()?.text()).collect();
    assert!(!text.is_empty());
}
