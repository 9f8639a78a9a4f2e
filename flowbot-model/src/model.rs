//! The chat-completion model trait.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::message::{ChatRequest, ModelResponse, StreamEvent};

/// A finite, single-pass stream of response events.
///
/// Dropping the stream releases the underlying connection.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// A chat-completion service.
///
/// Implementations are stateless between calls and shared behind an `Arc`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, used in log fields.
    fn name(&self) -> &str;

    /// Run one non-streaming completion.
    async fn complete(&self, request: &ChatRequest) -> Result<ModelResponse>;

    /// Run one streaming completion.
    ///
    /// Errors opening the stream are returned directly; errors after that are
    /// yielded as stream items.
    async fn stream(&self, request: &ChatRequest) -> Result<EventStream>;
}
