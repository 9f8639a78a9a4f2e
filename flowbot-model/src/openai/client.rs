//! OpenAI client implementation.

use async_stream::try_stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::config::OpenAIConfig;
use super::convert;
use crate::error::{ModelError, Result};
use crate::message::{ChatRequest, ModelResponse};
use crate::model::{ChatModel, EventStream};

/// OpenAI client for the Responses API and compatible services.
pub struct OpenAIClient {
    http: reqwest::Client,
    config: OpenAIConfig,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { http: reqwest::Client::new(), config })
    }

    /// Create a client for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(OpenAIConfig::compatible(api_key, base_url, model))
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .post(format!("{}/responses", self.config.api_base()))
            .bearer_auth(&self.config.api_key)
            .json(body);
        if let Some(org) = &self.config.organization_id {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await.map_err(|e| {
            error!(model = %self.config.model, error = %e, "request failed");
            ModelError::Request(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            error!(model = %self.config.model, %status, "API error");
            return Err(ModelError::Api { status: status.as_u16(), message });
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    #[instrument(
        skip_all,
        fields(
            model = %self.config.model,
            messages = request.messages.len(),
            tools = request.tools.len()
        )
    )]
    async fn complete(&self, request: &ChatRequest) -> Result<ModelResponse> {
        let body = convert::request_body(&self.config.model, request, false);
        let response = self.send(&body).await?;
        let value: Value = response.json().await.map_err(|e| ModelError::Decode(e.to_string()))?;
        let parsed = convert::parse_response(value)?;
        debug!(items = parsed.output.len(), "completion received");
        Ok(parsed)
    }

    #[instrument(skip_all, fields(model = %self.config.model, messages = request.messages.len()))]
    async fn stream(&self, request: &ChatRequest) -> Result<EventStream> {
        let body = convert::request_body(&self.config.model, request, true);
        let response = self.send(&body).await?;
        let mut events = response.bytes_stream().eventsource();

        let stream = try_stream! {
            while let Some(event) = events.next().await {
                let event = event.map_err(|e| ModelError::Stream(e.to_string()))?;
                if let Some(parsed) = convert::parse_event(&event.data)? {
                    yield parsed;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
