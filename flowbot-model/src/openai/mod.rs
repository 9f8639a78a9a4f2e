//! OpenAI Responses API provider.
//!
//! [`OpenAIClient`] talks to `POST /v1/responses` directly over `reqwest`.
//! Non-streaming calls decode the full response; streaming calls read the
//! server-sent event stream and surface each event as a
//! [`StreamEvent`](crate::StreamEvent).
//!
//! # Example
//!
//! ```rust,ignore
//! use flowbot_model::openai::{OpenAIClient, OpenAIConfig};
//!
//! let model = OpenAIClient::new(OpenAIConfig::new(
//!     std::env::var("OPENAI_API_KEY")?,
//!     "gpt-4.1",
//! ))?;
//! ```

mod client;
mod config;
mod convert;

pub use client::OpenAIClient;
pub use config::{DEFAULT_COMPLETION_MODEL, OPENAI_API_BASE, OpenAIConfig};
