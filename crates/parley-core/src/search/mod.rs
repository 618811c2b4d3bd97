//! Web search with a model-written analysis of the hits.
//!
//! A [`SearchProvider`] turns a query into structured [`SearchResult`]s;
//! [`SearchService`] runs the provider and asks the model for a short
//! analysis that the client renders under the result list.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{SearchConfig, SearchProviderKind};
use crate::core_types::{Message, Role, SearchReply, SearchResult};
use crate::errors::ChatError;
use crate::llm::{complete_text, LLM};

pub mod providers;

pub use providers::{DuckDuckGoProvider, SerperProvider, TavilyProvider};

const ANALYSIS_SYSTEM_PROMPT: &str = "You are a helpful research assistant. You are given web search results for a user's query. Write a brief analysis that answers the query using only these results, point out the most relevant items and mention dates when they matter. Keep it under 200 words.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("{provider} API returned status {status}: {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },
    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },
    #[error("{provider} request timed out")]
    Timeout { provider: String },
    #[error("{provider} API key not configured")]
    NoApiKey { provider: String },
    #[error("Failed to parse {provider} response: {message}")]
    Parse { provider: String, message: String },
    #[error("Search is not configured")]
    NotConfigured,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchResult>, SearchError>;

    fn name(&self) -> &'static str;
}

/// Build the configured provider, or `None` when search is switched off.
pub fn create_search_provider(
    config: &SearchConfig,
) -> Result<Option<Arc<dyn SearchProvider>>, SearchError> {
    if !config.enabled {
        return Ok(None);
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    let provider: Arc<dyn SearchProvider> = match config.provider {
        SearchProviderKind::DuckDuckGo => {
            Arc::new(DuckDuckGoProvider::new().with_timeout(timeout))
        }
        SearchProviderKind::Tavily => {
            let api_key = config.auth.api_key.clone().ok_or(SearchError::NoApiKey {
                provider: "Tavily".to_string(),
            })?;
            Arc::new(TavilyProvider::new(api_key).with_timeout(timeout))
        }
        SearchProviderKind::Serper => {
            let api_key = config.auth.api_key.clone().ok_or(SearchError::NoApiKey {
                provider: "Serper".to_string(),
            })?;
            Arc::new(SerperProvider::new(api_key).with_timeout(timeout))
        }
    };

    Ok(Some(provider))
}

pub struct SearchService {
    provider: Arc<dyn SearchProvider>,
    llm: Arc<dyn LLM>,
    max_results: usize,
}

impl SearchService {
    pub fn new(provider: Arc<dyn SearchProvider>, llm: Arc<dyn LLM>, max_results: usize) -> Self {
        Self {
            provider,
            llm,
            max_results,
        }
    }

    pub async fn search(&self, query: &str) -> Result<SearchReply, ChatError> {
        log::info!(
            "Searching {} for '{}' (max_results: {})",
            self.provider.name(),
            query,
            self.max_results
        );

        let results = self.provider.search(query, self.max_results).await?;

        if results.is_empty() {
            log::info!("No search results for '{}'", query);
            return Ok(SearchReply {
                role: Role::Assistant,
                content: format!(
                    "No results found for \"{}\". Try a different or more specific query.",
                    query
                ),
                search_results: None,
            });
        }

        let messages = vec![
            Message::system(ANALYSIS_SYSTEM_PROMPT),
            Message::user(analysis_prompt(query, &results)),
        ];
        let analysis = complete_text(self.llm.as_ref(), messages).await?;

        Ok(SearchReply {
            role: Role::Assistant,
            content: analysis,
            search_results: Some(results),
        })
    }
}

fn analysis_prompt(query: &str, results: &[SearchResult]) -> String {
    let listing = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "{}. {}\n   Source: {} | Published: {}\n   {}",
                i + 1,
                result.title,
                result.source,
                result.published_at.as_deref().unwrap_or("unknown"),
                result.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Search query: {}\n\nSearch results:\n\n{}\n\nProvide a brief analysis of these results.",
        query, listing
    )
}
