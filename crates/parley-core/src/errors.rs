//! Error types shared by the chat, summarization and search paths
//!
//! Failures are grouped by the collaborator that produced them (model, search
//! provider, page extractor, configuration) so callers at the HTTP boundary can
//! turn each one into the right user-facing payload.

use thiserror::Error;

use crate::extractor::ExtractionError;
use crate::search::SearchError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("LLM interaction failed: {0}")]
    LLMError(String),
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Failed to summarize the provided URL: {0}")]
    Summarize(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Parsing error: {0}")]
    ParsingError(String),
}
