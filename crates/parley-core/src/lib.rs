//! Core library for the Parley chat backend.
//!
//! Parley forwards chat turns to an OpenAI-compatible model, summarizes web
//! pages and answers web searches. This crate holds everything that does not
//! depend on a transport:
//!
//! - **Language model access**: the [`LLM`] trait and an OpenAI-compatible client
//! - **Content extraction**: fetching a page and reducing it to readable text
//! - **Summarization**: extraction, truncation and the URL-only fallbacks
//! - **Search**: pluggable search providers plus a model-written analysis
//! - **Chat service**: the entry point the HTTP server calls for every request
//! - **Configuration**: YAML configuration with `.env` resolution

pub mod chat;
pub mod config;
pub mod core_types;
pub mod errors;
pub mod extractor;
pub mod llm;
pub mod search;
pub mod summarizer;

pub use chat::{ChatRequest, ChatService};
pub use config::*;
pub use core_types::*;
pub use errors::ChatError;
pub use extractor::{extract_text, ContentSource, ExtractionError, WebExtractor};
pub use llm::LLM;
pub use search::{
    DuckDuckGoProvider, SearchError, SearchProvider, SearchService, SerperProvider, TavilyProvider,
};
pub use summarizer::Summarizer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
