//! Pinecone vector index and Pinecone-hosted rerank backends.
//!
//! [`PineconeVectorStore`] queries a serverless index over its data-plane REST
//! API. [`PineconeReranker`] calls the inference `rerank` endpoint, which
//! serves Cohere's `cohere-rerank-3.5` model by default.
//!
//! This module is only available when the `pinecone` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowbot_rag::pinecone::{PineconeReranker, PineconeVectorStore};
//!
//! let store = PineconeVectorStore::new("pc-...", "flowbot-kb")?;
//! let matches = store.query("default", &embedding, 9).await?;
//!
//! let reranker = PineconeReranker::new("pc-...")?;
//! let hits = reranker.rerank("query", &documents, 4).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::document::{RerankHit, RetrievalMatch};
use crate::error::{RagError, Result};
use crate::reranker::Reranker;
use crate::vectorstore::VectorStore;

/// Pinecone control-plane and inference base URL.
const PINECONE_API_BASE: &str = "https://api.pinecone.io";

/// API version pinned in every request.
const PINECONE_API_VERSION: &str = "2025-01";

/// The default rerank model.
pub const DEFAULT_RERANK_MODEL: &str = "cohere-rerank-3.5";

fn pinecone_request(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: &str,
    api_key: &str,
) -> reqwest::RequestBuilder {
    client
        .request(method, url)
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
}

/// Send a request and decode a JSON body, describing failures as plain text.
async fn send_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> std::result::Result<T, String> {
    let response = request.send().await.map_err(|e| format!("request failed: {e}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(format!("API returned {status}: {detail}"));
    }

    response.json().await.map_err(|e| format!("failed to parse response: {e}"))
}

/// Render a Pinecone metadata value as a string.
///
/// Pinecone stores numbers as floats, so integral values are printed without
/// a fractional part (`12.0` becomes `"12"`). `null` values are dropped.
fn metadata_value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(metadata_value_to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

// ── Pinecone API request/response types ────────────────────────────

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<HashMap<String, Value>>,
}

impl From<QueryMatch> for RetrievalMatch {
    fn from(m: QueryMatch) -> Self {
        let metadata = m
            .metadata
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(k, v)| metadata_value_to_string(v).map(|v| (k, v)))
            .collect();
        RetrievalMatch { id: m.id, score: m.score, metadata }
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<RerankDocument<'a>>,
    top_n: usize,
    return_documents: bool,
    parameters: RerankParameters,
}

#[derive(Serialize)]
struct RerankDocument<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct RerankParameters {
    truncate: &'static str,
}

#[derive(Deserialize)]
struct RerankResponse {
    #[serde(default)]
    data: Vec<RerankedRow>,
}

#[derive(Deserialize)]
struct RerankedRow {
    index: usize,
    score: f32,
    #[serde(default)]
    document: Option<RerankedDocument>,
}

#[derive(Deserialize)]
struct RerankedDocument {
    #[serde(default)]
    text: String,
}

// ── Vector index ───────────────────────────────────────────────────

/// A [`VectorStore`] backed by a [Pinecone](https://www.pinecone.io/) index.
///
/// The data-plane host is either supplied with [`with_host`](Self::with_host)
/// or resolved once from the control plane on first query and cached.
pub struct PineconeVectorStore {
    client: reqwest::Client,
    api_key: String,
    index_name: String,
    api_base: String,
    host: OnceCell<String>,
}

impl PineconeVectorStore {
    /// Create a store for the named index.
    pub fn new(api_key: impl Into<String>, index_name: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let index_name = index_name.into();
        if api_key.is_empty() {
            return Err(Self::err("API key must not be empty"));
        }
        if index_name.is_empty() {
            return Err(Self::err("index name must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            index_name,
            api_base: PINECONE_API_BASE.into(),
            host: OnceCell::new(),
        })
    }

    /// Use a known data-plane host instead of resolving it.
    ///
    /// Accepts the host with or without a scheme.
    pub fn with_host(self, host: impl Into<String>) -> Self {
        let host = normalize_host(&host.into());
        Self { host: OnceCell::new_with(Some(host)), ..self }
    }

    /// Override the control-plane base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Name of the index this store queries.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn host(&self) -> Result<&str> {
        self.host
            .get_or_try_init(|| async {
                let url = format!("{}/indexes/{}", self.api_base, self.index_name);
                let request =
                    pinecone_request(&self.client, reqwest::Method::GET, &url, &self.api_key);
                let described: DescribeIndexResponse = send_json(request).await.map_err(|e| {
                    error!(index = %self.index_name, error = %e, "failed to describe index");
                    Self::err(format!("failed to resolve host for '{}': {e}", self.index_name))
                })?;
                info!(index = %self.index_name, host = %described.host, "resolved index host");
                Ok(normalize_host(&described.host))
            })
            .await
            .map(String::as_str)
    }

    fn err(message: impl Into<String>) -> RagError {
        RagError::VectorStoreError { backend: "pinecone".to_string(), message: message.into() }
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalMatch>> {
        let host = self.host().await?;
        debug!(index = %self.index_name, namespace, top_k, "querying index");

        let body = QueryRequest {
            namespace,
            vector: embedding,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        let request = pinecone_request(
            &self.client,
            reqwest::Method::POST,
            &format!("{host}/query"),
            &self.api_key,
        )
        .json(&body);

        let response: QueryResponse = send_json(request).await.map_err(|e| {
            error!(index = %self.index_name, namespace, error = %e, "query failed");
            Self::err(e)
        })?;

        Ok(response.matches.into_iter().map(RetrievalMatch::from).collect())
    }
}

// ── Reranker ───────────────────────────────────────────────────────

/// A [`Reranker`] backed by Pinecone's inference rerank endpoint.
pub struct PineconeReranker {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl PineconeReranker {
    /// Create a reranker using `cohere-rerank-3.5`.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Self::err("API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: PINECONE_API_BASE.into(),
            model: DEFAULT_RERANK_MODEL.into(),
        })
    }

    /// Set the rerank model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the inference base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn err(message: impl Into<String>) -> RagError {
        RagError::RerankerError { reranker: "pinecone".to_string(), message: message.into() }
    }
}

#[async_trait]
impl Reranker for PineconeReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        debug!(model = %self.model, candidates = documents.len(), top_n, "reranking");

        let body = RerankRequest {
            model: &self.model,
            query,
            documents: documents
                .iter()
                .map(|text| RerankDocument { text: text.as_str() })
                .collect(),
            top_n: top_n.min(documents.len()),
            return_documents: true,
            parameters: RerankParameters { truncate: "END" },
        };
        let request = pinecone_request(
            &self.client,
            reqwest::Method::POST,
            &format!("{}/rerank", self.api_base),
            &self.api_key,
        )
        .json(&body);

        let response: RerankResponse = send_json(request).await.map_err(|e| {
            error!(model = %self.model, error = %e, "rerank failed");
            Self::err(e)
        })?;

        Ok(response
            .data
            .into_iter()
            .map(|row| RerankHit {
                index: row.index,
                text: row.document.map(|d| d.text).unwrap_or_default(),
                score: row.score,
            })
            .collect())
    }
}
