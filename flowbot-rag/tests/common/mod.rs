//! Test doubles for the retrieval backends.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use flowbot_rag::{
    EmbeddingProvider, RagError, RerankHit, Reranker, Result, RetrievalConfig, RetrievalMatch,
    RetrievalPipeline, VectorStore,
};

/// Returns a constant vector, or fails when `fail` is set.
#[derive(Default)]
pub struct FixedEmbedder {
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::EmbeddingError {
                provider: "fixed".into(),
                message: "quota exceeded".into(),
            });
        }
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        3
    }

    fn model(&self) -> &str {
        "fixed"
    }
}

/// Serves a canned match list, truncated to `top_k`.
#[derive(Default)]
pub struct StaticStore {
    pub matches: Vec<RetrievalMatch>,
    pub calls: AtomicUsize,
    pub last_namespace: std::sync::Mutex<Option<String>>,
}

#[async_trait]
impl VectorStore for StaticStore {
    async fn query(
        &self,
        namespace: &str,
        _embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievalMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_namespace.lock().unwrap() = Some(namespace.to_string());
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }
}

/// Scores each candidate from a fixed table keyed by candidate text.
#[derive(Default)]
pub struct TableReranker {
    pub scores: HashMap<String, f32>,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub documents: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl Reranker for TableReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.documents.lock().unwrap() = documents.to_vec();
        if self.fail {
            return Err(RagError::RerankerError {
                reranker: "table".into(),
                message: "service unavailable".into(),
            });
        }
        let mut hits: Vec<RerankHit> = documents
            .iter()
            .enumerate()
            .map(|(index, text)| RerankHit {
                index,
                text: text.clone(),
                score: self.scores.get(text).copied().unwrap_or(0.0),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(top_n);
        Ok(hits)
    }
}

/// Returns exactly the hits it was given.
pub struct CannedReranker(pub Vec<RerankHit>);

#[async_trait]
impl Reranker for CannedReranker {
    async fn rerank(&self, _: &str, _: &[String], _: usize) -> Result<Vec<RerankHit>> {
        Ok(self.0.clone())
    }
}

pub fn chunk(id: &str, body: &str, summary: &str) -> RetrievalMatch {
    let mut metadata = HashMap::from([
        ("original_text".to_string(), body.to_string()),
        ("source_file".to_string(), format!("{id}.pdf")),
        ("document_id".to_string(), "7".to_string()),
    ]);
    if !summary.is_empty() {
        metadata.insert("contextual_summary".to_string(), summary.to_string());
    }
    RetrievalMatch { id: id.to_string(), score: 0.5, metadata }
}

pub fn pipeline(
    embedder: Arc<FixedEmbedder>,
    store: Arc<StaticStore>,
    reranker: Arc<dyn Reranker>,
) -> RetrievalPipeline {
    RetrievalPipeline::builder()
        .config(RetrievalConfig::builder().namespace("kb").build().unwrap())
        .embedding_provider(embedder)
        .vector_store(store)
        .reranker(reranker)
        .build()
        .unwrap()
}
