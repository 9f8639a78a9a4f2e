//! Runtime settings read from the environment.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use flowbot_chat::{
    ChatConfig, ChatOrchestrator, DEFAULT_ASSISTANT_NAME, DEFAULT_INDEX_NAME,
    DEFAULT_MAX_HISTORY_TURNS, DEFAULT_MAX_TOOL_ROUNDS,
};
use flowbot_model::openai::{DEFAULT_COMPLETION_MODEL, OpenAIClient, OpenAIConfig};
use flowbot_rag::openai::{DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL};
use flowbot_rag::{
    DEFAULT_TOP_K, DEFAULT_TOP_N, OpenAIEmbeddingProvider, PineconeReranker, PineconeVectorStore,
    RetrievalConfig, RetrievalPipeline,
};

/// Namespace queried when `PINECONE_NAMESPACE` is unset.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Everything needed to wire the clients and the orchestrator.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub completion_model: String,
    pub index_name: String,
    pub index_host: Option<String>,
    pub namespace: String,
    pub top_k: usize,
    pub top_n: usize,
    pub max_tool_rounds: usize,
    pub history_turns: usize,
    pub assistant_name: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("embedding_model", &self.embedding_model)
            .field("completion_model", &self.completion_model)
            .field("index_name", &self.index_name)
            .field("namespace", &self.namespace)
            .field("top_k", &self.top_k)
            .field("top_n", &self.top_n)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| anyhow!("{key} must be set"));
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            pinecone_api_key: required("PINECONE_API_KEY")?,
            embedding_model: or_default("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            embedding_dimension: parse_or(
                &get,
                "EMBEDDING_DIMENSION",
                DEFAULT_EMBEDDING_DIMENSIONS,
            )?,
            completion_model: or_default("COMPLETION_MODEL", DEFAULT_COMPLETION_MODEL),
            index_name: or_default("PINECONE_INDEX_NAME", DEFAULT_INDEX_NAME),
            index_host: get("PINECONE_INDEX_HOST"),
            namespace: or_default("PINECONE_NAMESPACE", DEFAULT_NAMESPACE),
            top_k: parse_or(&get, "FLOWBOT_TOP_K", DEFAULT_TOP_K)?,
            top_n: parse_or(&get, "FLOWBOT_TOP_N", DEFAULT_TOP_N)?,
            max_tool_rounds: parse_or(&get, "FLOWBOT_MAX_TOOL_ROUNDS", DEFAULT_MAX_TOOL_ROUNDS)?,
            history_turns: parse_or(&get, "FLOWBOT_HISTORY_TURNS", DEFAULT_MAX_HISTORY_TURNS)?,
            assistant_name: or_default("FLOWBOT_ASSISTANT_NAME", DEFAULT_ASSISTANT_NAME),
        })
    }

    pub fn chat_config(&self) -> Result<ChatConfig> {
        ChatConfig::builder()
            .assistant_name(&self.assistant_name)
            .index_name(&self.index_name)
            .max_tool_rounds(self.max_tool_rounds)
            .max_history_turns(self.history_turns)
            .build()
            .context("invalid chat settings")
    }

    pub fn retrieval_pipeline(&self) -> Result<RetrievalPipeline> {
        let embedder = OpenAIEmbeddingProvider::new(&self.openai_api_key)?
            .with_model(&self.embedding_model)
            .with_dimensions(self.embedding_dimension);
        let mut store = PineconeVectorStore::new(&self.pinecone_api_key, &self.index_name)?;
        if let Some(host) = &self.index_host {
            store = store.with_host(host);
        }
        let reranker = PineconeReranker::new(&self.pinecone_api_key)?;

        RetrievalPipeline::builder()
            .config(
                RetrievalConfig::builder()
                    .namespace(&self.namespace)
                    .top_k(self.top_k)
                    .top_n(self.top_n)
                    .build()?,
            )
            .embedding_provider(Arc::new(embedder))
            .vector_store(Arc::new(store))
            .reranker(Arc::new(reranker))
            .build()
            .context("failed to build retrieval pipeline")
    }

    pub fn orchestrator(&self) -> Result<ChatOrchestrator> {
        let config = OpenAIConfig::new(&self.openai_api_key, &self.completion_model);
        let model = OpenAIClient::new(config)?;
        let pipeline = self.retrieval_pipeline()?;
        Ok(ChatOrchestrator::new(Arc::new(model), Arc::new(pipeline), self.chat_config()?)?)
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("{key} has invalid value '{raw}'")),
        None => Ok(default),
    }
}
