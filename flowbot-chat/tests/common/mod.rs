//! Shared fixtures for orchestrator tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flowbot_chat::{ChatConfig, ChatOrchestrator};
use flowbot_model::{ChatRequest, Message, MockChatModel};
use flowbot_rag::{
    EmbeddingProvider, InMemoryVectorStore, NoOpReranker, RagError, Result, RetrievalConfig,
    RetrievalPipeline,
};

pub const NAMESPACE: &str = "handbook";

/// Records every query it embeds.
#[derive(Default)]
pub struct RecordingEmbedder {
    pub queries: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingEmbedder {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.queries.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(RagError::EmbeddingError {
                provider: "recording".into(),
                message: "connection reset".into(),
            });
        }
        Ok(vec![1.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model(&self) -> &str {
        "recording"
    }
}

/// An index holding one vacation-policy chunk.
pub async fn handbook_store() -> Arc<InMemoryVectorStore> {
    let store = InMemoryVectorStore::new();
    let metadata = HashMap::from([
        ("original_text".to_string(), "Employees receive 25 vacation days per year.".to_string()),
        ("source_file".to_string(), "handbook.pdf".to_string()),
        ("document_id".to_string(), "12".to_string()),
    ]);
    store.insert(NAMESPACE, "chunk-1", vec![1.0, 0.0], metadata).await.unwrap();
    Arc::new(store)
}

pub fn pipeline(
    embedder: Arc<RecordingEmbedder>,
    store: Arc<InMemoryVectorStore>,
) -> Arc<RetrievalPipeline> {
    let pipeline = RetrievalPipeline::builder()
        .config(RetrievalConfig::builder().namespace(NAMESPACE).build().unwrap())
        .embedding_provider(embedder)
        .vector_store(store)
        .reranker(Arc::new(NoOpReranker))
        .build()
        .unwrap();
    Arc::new(pipeline)
}

pub fn orchestrator(
    model: Arc<MockChatModel>,
    pipeline: Arc<RetrievalPipeline>,
) -> ChatOrchestrator {
    ChatOrchestrator::new(model, pipeline, ChatConfig::default()).unwrap()
}

/// Asserts every tool call is directly followed by the result with its id.
pub fn assert_calls_paired(request: &ChatRequest) {
    let messages = &request.messages;
    for (i, message) in messages.iter().enumerate() {
        if let Message::ToolCall(call) = message {
            match messages.get(i + 1) {
                Some(Message::ToolResult { call_id, .. }) => assert_eq!(call_id, &call.call_id),
                other => panic!("tool call {} followed by {other:?}", call.call_id),
            }
        }
    }
}

/// The output of the tool result answering `call_id`.
pub fn tool_output<'a>(request: &'a ChatRequest, call_id: &str) -> Option<&'a str> {
    request.messages.iter().find_map(|m| match m {
        Message::ToolResult { call_id: id, output } if id == call_id => Some(output.as_str()),
        _ => None,
    })
}
