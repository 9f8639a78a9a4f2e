//! # flowbot-rag
//!
//! Retrieval for FlowBot chatbots.
//!
//! This crate turns a user question into a block of context text: it embeds
//! the question, fetches nearest neighbors from a namespaced vector index,
//! reranks them with a cross-encoder, and renders the survivors. The
//! [`RetrievalPipeline`] composes those steps and never fails towards its
//! caller; see [`RetrievalOutcome`].
//!
//! ## Features
//!
//! External backends are feature-gated. The default feature set includes only
//! the traits, the in-memory index and the no-op reranker.
//!
//! | Feature    | What it enables                                      |
//! |------------|------------------------------------------------------|
//! | `openai`   | `OpenAIEmbeddingProvider` via reqwest                |
//! | `pinecone` | `PineconeVectorStore` and `PineconeReranker` via reqwest |
//! | `full`     | All of the above                                     |

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod format;
pub mod inmemory;
pub mod pipeline;
pub mod reranker;
pub mod tool;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pinecone")]
pub mod pinecone;

pub use config::{DEFAULT_TOP_K, DEFAULT_TOP_N, RetrievalConfig, RetrievalConfigBuilder};
pub use document::{RerankHit, RerankedMatch, RetrievalMatch};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result, ToolArgumentError};
pub use format::FormattedContext;
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{
    NO_RESULTS_MESSAGE, RetrievalOutcome, RetrievalPipeline, RetrievalPipelineBuilder,
    SEARCH_ERROR_PREFIX,
};
pub use reranker::{NoOpReranker, Reranker};
pub use tool::{RETRIEVE_KNOWLEDGE, RetrieveKnowledgeArgs};
pub use vectorstore::VectorStore;

#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
#[cfg(feature = "pinecone")]
pub use pinecone::{PineconeReranker, PineconeVectorStore};
