//! Scripted chat model for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use crate::error::{ModelError, Result};
use crate::message::{ChatRequest, ModelResponse, StreamEvent};
use crate::model::{ChatModel, EventStream};

/// How a scripted streaming call behaves.
#[derive(Debug, Clone)]
pub enum MockStream {
    /// Yield these events, then end.
    Events(Vec<StreamEvent>),
    /// Yield these events, then a stream error with the given message.
    FailAfter(Vec<StreamEvent>, String),
    /// Fail before the stream opens.
    FailToOpen(String),
}

impl MockStream {
    /// A stream yielding `chunks` as text deltas followed by completion.
    pub fn text<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events: Vec<StreamEvent> =
            chunks.into_iter().map(|c| StreamEvent::TextDelta(c.into())).collect();
        events.push(StreamEvent::Completed);
        Self::Events(events)
    }
}

/// A [`ChatModel`] that replays scripted responses and records every request.
///
/// `complete` and `stream` each pop from their own queue; an exhausted queue
/// answers with a [`ModelError::Request`].
#[derive(Debug, Default)]
pub struct MockChatModel {
    completions: Mutex<VecDeque<Result<ModelResponse>>>,
    streams: Mutex<VecDeque<MockStream>>,
    complete_requests: Mutex<Vec<ChatRequest>>,
    stream_requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatModel {
    /// Create a mock with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful non-streaming response.
    pub fn with_completion(self, response: ModelResponse) -> Self {
        lock(&self.completions).push_back(Ok(response));
        self
    }

    /// Queue a failing non-streaming call.
    pub fn with_completion_error(self, message: impl Into<String>) -> Self {
        lock(&self.completions).push_back(Err(ModelError::Request(message.into())));
        self
    }

    /// Queue a streaming call.
    pub fn with_stream(self, script: MockStream) -> Self {
        lock(&self.streams).push_back(script);
        self
    }

    /// Requests received by `complete`, in order.
    pub fn complete_requests(&self) -> Vec<ChatRequest> {
        lock(&self.complete_requests).clone()
    }

    /// Requests received by `stream`, in order.
    pub fn stream_requests(&self) -> Vec<ChatRequest> {
        lock(&self.stream_requests).clone()
    }

    /// Total number of model invocations of either kind.
    pub fn call_count(&self) -> usize {
        lock(&self.complete_requests).len() + lock(&self.stream_requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ModelResponse> {
        lock(&self.complete_requests).push(request.clone());
        lock(&self.completions)
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Request("mock completion script exhausted".into())))
    }

    async fn stream(&self, request: &ChatRequest) -> Result<EventStream> {
        lock(&self.stream_requests).push(request.clone());
        let script = lock(&self.streams).pop_front();
        match script {
            None => Err(ModelError::Request("mock stream script exhausted".into())),
            Some(MockStream::FailToOpen(message)) => Err(ModelError::Request(message)),
            Some(MockStream::Events(events)) => {
                Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
            }
            Some(MockStream::FailAfter(events, message)) => {
                let items = events
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(ModelError::Stream(message))));
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }
}
