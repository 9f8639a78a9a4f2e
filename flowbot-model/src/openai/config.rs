//! Configuration for the OpenAI client.

use crate::error::{ModelError, Result};

/// Default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default completion model.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4.1";

/// Connection settings for [`OpenAIClient`](super::OpenAIClient).
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Model name, e.g. `gpt-4.1`.
    pub model: String,
    /// Base URL override for OpenAI-compatible services.
    pub base_url: Option<String>,
    /// Optional organization header.
    pub organization_id: Option<String>,
}

impl OpenAIConfig {
    /// Create a config for the public OpenAI API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), base_url: None, organization_id: None }
    }

    /// Create a config for an OpenAI-compatible endpoint.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self { base_url: Some(base_url.into()), ..Self::new(api_key, model) }
    }

    /// Set the organization header.
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Base URL without a trailing slash.
    pub(crate) fn api_base(&self) -> String {
        self.base_url.as_deref().unwrap_or(OPENAI_API_BASE).trim_end_matches('/').to_string()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ModelError::Config("API key must not be empty".into()));
        }
        if self.model.is_empty() {
            return Err(ModelError::Config("model must not be empty".into()));
        }
        Ok(())
    }
}
