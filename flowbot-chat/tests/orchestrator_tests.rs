//! Conversation scenarios driven by a scripted model.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{
    NAMESPACE, RecordingEmbedder, assert_calls_paired, handbook_store, orchestrator, pipeline,
    tool_output,
};
use flowbot_chat::{ChatConfig, ChatOrchestrator, ConversationTurn, FALLBACK_RESPONSE};
use flowbot_model::{Message, MockChatModel, MockStream, ModelResponse, StreamEvent};
use flowbot_rag::{
    InMemoryVectorStore, NO_RESULTS_MESSAGE, NoOpReranker, RetrievalConfig, RetrievalPipeline,
};
use futures::StreamExt;

fn retrieve(call_id: &str, query: &str) -> ModelResponse {
    ModelResponse::tool_call(call_id, "retrieve_knowledge", format!(r#"{{"query":"{query}"}}"#))
}

async fn collect(orchestrator: &ChatOrchestrator, query: &str) -> Vec<String> {
    orchestrator.process_chat(&[], query).collect().await
}

#[tokio::test]
async fn empty_index_hands_sentinel_to_model() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(retrieve("call_1", "parental leave"))
            .with_completion(ModelResponse::text("I couldn't find anything on that.")),
    );
    let embedder = Arc::new(RecordingEmbedder::default());
    let store = Arc::new(InMemoryVectorStore::new());
    let chat = orchestrator(model.clone(), pipeline(embedder, store));

    let answer = chat.chat(&[], "What is the parental leave policy?").await;

    assert_eq!(answer, "I couldn't find anything on that.");
    let requests = model.complete_requests();
    assert_eq!(tool_output(&requests[1], "call_1"), Some(NO_RESULTS_MESSAGE));
}

#[tokio::test]
async fn direct_answer_makes_one_call_and_no_retrieval() {
    let model = Arc::new(
        MockChatModel::new().with_completion(ModelResponse::text("Hello! How can I help?")),
    );
    let embedder = Arc::new(RecordingEmbedder::default());
    let chat = orchestrator(model.clone(), pipeline(embedder.clone(), handbook_store().await));

    let answer = chat.chat(&[], "hi").await;

    assert_eq!(answer, "Hello! How can I help?");
    assert_eq!(model.call_count(), 1);
    assert!(embedder.queries().is_empty());
    assert_eq!(model.complete_requests()[0].tools.len(), 1);
}

#[tokio::test]
async fn single_retrieval_then_answer() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(retrieve("call_1", "vacation days"))
            .with_completion(ModelResponse::text("You get 25 vacation days.")),
    );
    let embedder = Arc::new(RecordingEmbedder::default());
    let chat = orchestrator(model.clone(), pipeline(embedder.clone(), handbook_store().await));

    let answer = chat.chat(&[], "How many vacation days do I get?").await;

    assert_eq!(answer, "You get 25 vacation days.");
    assert_eq!(embedder.queries(), vec!["vacation days".to_string()]);
    let requests = model.complete_requests();
    assert_eq!(requests.len(), 2);
    assert_calls_paired(&requests[1]);
    let context = tool_output(&requests[1], "call_1").unwrap();
    assert!(context.starts_with("1\n\nID: chunk-1\nDocument: handbook.pdf (ID: 12)\n"));
    assert!(context.ends_with("Content: Employees receive 25 vacation days per year."));
}

#[tokio::test]
async fn single_retrieval_then_streamed_answer() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(retrieve("call_1", "vacation days"))
            .with_completion(ModelResponse::text("draft that is not shown"))
            .with_stream(MockStream::text(["You get ", "25 ", "vacation days."])),
    );
    let embedder = Arc::new(RecordingEmbedder::default());
    let chat = orchestrator(model.clone(), pipeline(embedder.clone(), handbook_store().await));

    let chunks = collect(&chat, "How many vacation days do I get?").await;

    assert_eq!(chunks, vec!["You get ", "25 ", "vacation days."]);
    assert_eq!(embedder.queries().len(), 1);
    assert_eq!(model.complete_requests().len(), 2);
    let streamed = model.stream_requests();
    assert_eq!(streamed.len(), 1);
    assert!(streamed[0].tools.is_empty());
    assert_calls_paired(&streamed[0]);
}

#[tokio::test]
async fn round_limit_forces_final_answer() {
    let mut model = MockChatModel::new();
    for round in 0..5 {
        model = model.with_completion(retrieve(&format!("call_{round}"), "leave"));
    }
    let model = Arc::new(model.with_completion(ModelResponse::text("Best effort answer.")));
    let embedder = Arc::new(RecordingEmbedder::default());
    let chat = orchestrator(model.clone(), pipeline(embedder.clone(), handbook_store().await));

    let answer = chat.chat(&[], "Tell me about leave").await;

    assert_eq!(answer, "Best effort answer.");
    assert_eq!(embedder.queries().len(), 5);
    let requests = model.complete_requests();
    assert_eq!(requests.len(), 6);
    let last = requests.last().unwrap();
    assert!(last.tools.is_empty());
    assert_calls_paired(last);
    let tool_calls = last.messages.iter().filter(|m| matches!(m, Message::ToolCall(_))).count();
    assert_eq!(tool_calls, 5);
}

#[tokio::test]
async fn round_limit_in_streaming_mode() {
    let mut model = MockChatModel::new();
    for round in 0..5 {
        model = model.with_completion(retrieve(&format!("call_{round}"), "leave"));
    }
    let model = Arc::new(model.with_stream(MockStream::text(["Done."])));
    let embedder = Arc::new(RecordingEmbedder::default());
    let chat = orchestrator(model.clone(), pipeline(embedder.clone(), handbook_store().await));

    let chunks = collect(&chat, "Tell me about leave").await;

    assert_eq!(chunks, vec!["Done."]);
    assert_eq!(embedder.queries().len(), 5);
    assert_eq!(model.complete_requests().len(), 5);
    assert_eq!(model.stream_requests().len(), 1);
}

#[tokio::test]
async fn mid_stream_failure_ends_with_error_chunk() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(ModelResponse::text("draft"))
            .with_stream(MockStream::FailAfter(
                vec![StreamEvent::TextDelta("Partial ".into())],
                "connection reset".into(),
            )),
    );
    let chat = orchestrator(model, pipeline(Arc::default(), handbook_store().await));

    let chunks = collect(&chat, "hello").await;

    assert_eq!(
        chunks,
        vec![
            "Partial ".to_string(),
            "I'm sorry, an error occurred while processing your request: Stream error: connection reset"
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn failed_event_is_reported_as_error() {
    let model = Arc::new(
        MockChatModel::new().with_completion(ModelResponse::text("draft")).with_stream(
            MockStream::Events(vec![
                StreamEvent::TextDelta("Hi".into()),
                StreamEvent::Failed("server overloaded".into()),
                StreamEvent::TextDelta("never".into()),
            ]),
        ),
    );
    let chat = orchestrator(model, pipeline(Arc::default(), handbook_store().await));

    let chunks = collect(&chat, "hello").await;

    assert_eq!(chunks.len(), 2);
    assert!(chunks[1].ends_with("Stream error: server overloaded"));
}

#[tokio::test]
async fn stream_that_fails_to_open_yields_one_chunk() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(ModelResponse::text("draft"))
            .with_stream(MockStream::FailToOpen("429 Too Many Requests".into())),
    );
    let chat = orchestrator(model, pipeline(Arc::default(), handbook_store().await));

    let chunks = collect(&chat, "hello").await;

    assert_eq!(
        chunks,
        vec![
            "I'm sorry, an error occurred while processing your request: Request failed: 429 Too Many Requests"
        ]
    );
}

#[tokio::test]
async fn empty_stream_falls_back_to_full_response() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(ModelResponse::text("draft"))
            .with_stream(MockStream::Events(vec![
                StreamEvent::Other("response.created".into()),
                StreamEvent::ContentPartAdded { text: Some(String::new()) },
                StreamEvent::Completed,
            ]))
            .with_completion(ModelResponse::text("Full answer.")),
    );
    let chat = orchestrator(model.clone(), pipeline(Arc::default(), handbook_store().await));

    let chunks = collect(&chat, "hello").await;

    assert_eq!(chunks, vec!["Full answer."]);
    let requests = model.complete_requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].tools.is_empty());
}

#[tokio::test]
async fn empty_fallback_uses_fixed_sentence() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(ModelResponse::text("draft"))
            .with_stream(MockStream::Events(vec![StreamEvent::Completed]))
            .with_completion(ModelResponse::default()),
    );
    let chat = orchestrator(model, pipeline(Arc::default(), handbook_store().await));

    assert_eq!(collect(&chat, "hello").await, vec![FALLBACK_RESPONSE]);
}

#[tokio::test]
async fn content_part_text_is_forwarded() {
    let model = Arc::new(
        MockChatModel::new().with_completion(ModelResponse::text("draft")).with_stream(
            MockStream::Events(vec![
                StreamEvent::ContentPartAdded { text: Some("Hel".into()) },
                StreamEvent::TextDelta("lo".into()),
                StreamEvent::Completed,
            ]),
        ),
    );
    let chat = orchestrator(model, pipeline(Arc::default(), handbook_store().await));

    assert_eq!(collect(&chat, "hello").await, vec!["Hel", "lo"]);
}

#[tokio::test]
async fn planning_failure_is_returned_as_text() {
    let model = Arc::new(MockChatModel::new().with_completion_error("connection refused"));
    let chat = orchestrator(model, pipeline(Arc::default(), handbook_store().await));

    let answer = chat.chat(&[], "hello").await;

    assert_eq!(
        answer,
        "I'm sorry, an error occurred while processing your request: Request failed: connection refused"
    );
}

#[tokio::test]
async fn invalid_arguments_are_reported_without_retrieval() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(ModelResponse::tool_call(
                "call_1",
                "retrieve_knowledge",
                r#"{"q":"pto"}"#,
            ))
            .with_completion(ModelResponse::tool_call("call_2", "retrieve_knowledge", "{not json"))
            .with_completion(ModelResponse::text("Could you rephrase?")),
    );
    let embedder = Arc::new(RecordingEmbedder::default());
    let chat = orchestrator(model.clone(), pipeline(embedder.clone(), handbook_store().await));

    let answer = chat.chat(&[], "pto?").await;

    assert_eq!(answer, "Could you rephrase?");
    assert!(embedder.queries().is_empty());
    let last = model.complete_requests().pop().unwrap();
    assert_calls_paired(&last);
    assert_eq!(
        tool_output(&last, "call_1"),
        Some("Invalid arguments for retrieve_knowledge: missing required 'query' parameter")
    );
    assert!(
        tool_output(&last, "call_2")
            .unwrap()
            .starts_with("Invalid arguments for retrieve_knowledge: malformed arguments:")
    );
}

#[tokio::test]
async fn unknown_tool_is_not_executed() {
    let model = Arc::new(
        MockChatModel::new().with_completion(ModelResponse::tool_call(
            "call_1",
            "delete_documents",
            "{}",
        )),
    );
    let embedder = Arc::new(RecordingEmbedder::default());
    let chat = orchestrator(model.clone(), pipeline(embedder.clone(), handbook_store().await));

    let answer = chat.chat(&[], "wipe it").await;

    assert_eq!(answer, FALLBACK_RESPONSE);
    assert_eq!(model.call_count(), 1);
    assert!(embedder.queries().is_empty());
}

#[tokio::test]
async fn retrieval_failure_is_passed_to_model() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(retrieve("call_1", "benefits"))
            .with_completion(ModelResponse::text("Search is unavailable right now.")),
    );
    let embedder = Arc::new(RecordingEmbedder { fail: true, ..Default::default() });
    let chat = orchestrator(model.clone(), pipeline(embedder, handbook_store().await));

    let answer = chat.chat(&[], "benefits?").await;

    assert_eq!(answer, "Search is unavailable right now.");
    let requests = model.complete_requests();
    assert!(tool_output(&requests[1], "call_1").unwrap().starts_with("Error performing search:"));
}

#[tokio::test]
async fn history_is_windowed_and_ordered() {
    let history: Vec<ConversationTurn> = (0..20)
        .map(|i| {
            if i % 2 == 0 {
                ConversationTurn::user(format!("question {i}"))
            } else {
                ConversationTurn::assistant(format!("answer {i}"))
            }
        })
        .collect();
    let model = Arc::new(MockChatModel::new().with_completion(ModelResponse::text("ok")));
    let chat = orchestrator(model.clone(), pipeline(Arc::default(), handbook_store().await));

    chat.chat(&history, "latest").await;

    let messages = &model.complete_requests()[0].messages;
    assert_eq!(messages.len(), 18);
    assert!(matches!(
        &messages[0],
        Message::System(prompt) if prompt.contains("FlowBot Assistant")
    ));
    assert_eq!(messages[1], Message::user("question 4"));
    assert_eq!(messages[16], Message::assistant("answer 19"));
    assert_eq!(messages[17], Message::user("latest"));
}

#[tokio::test]
async fn custom_round_limit_is_respected() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(retrieve("call_1", "a"))
            .with_completion(retrieve("call_2", "b"))
            .with_completion(ModelResponse::text("final")),
    );
    let embedder = Arc::new(RecordingEmbedder::default());
    let config = ChatConfig::builder().max_tool_rounds(1).build().unwrap();
    let pipeline = pipeline(embedder.clone(), handbook_store().await);
    let chat = ChatOrchestrator::new(model.clone(), pipeline, config).unwrap();

    let answer = chat.chat(&[], "q").await;

    // The second scripted tool call is consumed by the forced final call.
    assert_eq!(answer, FALLBACK_RESPONSE);
    assert_eq!(embedder.queries(), vec!["a".to_string()]);
    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn retrieval_uses_pipeline_limits() {
    let store = InMemoryVectorStore::new();
    for (id, text) in [("a", "Policy A"), ("b", "Policy B"), ("c", "Policy C")] {
        let metadata = HashMap::from([("original_text".to_string(), text.to_string())]);
        store.insert(NAMESPACE, id, vec![1.0, 0.0], metadata).await.unwrap();
    }
    let pipeline = RetrievalPipeline::builder()
        .config(RetrievalConfig::builder().namespace(NAMESPACE).top_k(3).top_n(1).build().unwrap())
        .embedding_provider(Arc::new(RecordingEmbedder::default()))
        .vector_store(Arc::new(store))
        .reranker(Arc::new(NoOpReranker))
        .build()
        .unwrap();
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(retrieve("call_1", "policy"))
            .with_completion(ModelResponse::text("done")),
    );
    let chat = orchestrator(model.clone(), Arc::new(pipeline));

    chat.chat(&[], "policies?").await;

    let context = tool_output(&model.complete_requests()[1], "call_1").unwrap().to_string();
    assert_eq!(context.matches("ID: ").count(), 1);
}

#[tokio::test]
async fn dropping_stream_early_stops_the_conversation() {
    let model = Arc::new(
        MockChatModel::new()
            .with_completion(ModelResponse::text("draft"))
            .with_stream(MockStream::text(["one ", "two ", "three"])),
    );
    let chat = orchestrator(model.clone(), pipeline(Arc::default(), handbook_store().await));

    let first: Vec<String> = chat.process_chat(&[], "count").take(1).collect().await;

    assert_eq!(first, vec!["one "]);
    assert_eq!(model.call_count(), 2);
}

#[test]
fn orchestrator_is_shareable() {
    fn assert_shareable<T: Clone + Send + Sync + 'static>() {}
    assert_shareable::<ChatOrchestrator>();
}
