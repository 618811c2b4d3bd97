//! Request handling for one chat turn.
//!
//! [`ChatService`] owns the model, the summarizer and the optional search
//! service, and maps a [`ChatRequest`] onto the matching [`ChatReply`].

use std::sync::Arc;

use crate::config::ParleyConfig;
use crate::core_types::{ChatReply, Message, Role, SearchReply, SummaryResult};
use crate::errors::ChatError;
use crate::extractor::{ContentSource, WebExtractor};
use crate::llm::{complete_text, create_llm_client, LLM};
use crate::search::{create_search_provider, SearchError, SearchService};
use crate::summarizer::Summarizer;

/// A single user action, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRequest {
    SendText {
        user_input: String,
        history: Vec<Message>,
    },
    Summarize {
        url: String,
    },
    Search {
        query: String,
    },
}

pub struct ChatService {
    llm: Arc<dyn LLM>,
    system_prompt: String,
    summarizer: Summarizer,
    search: Option<SearchService>,
}

impl ChatService {
    pub fn new(
        llm: Arc<dyn LLM>,
        system_prompt: impl Into<String>,
        summarizer: Summarizer,
        search: Option<SearchService>,
    ) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
            summarizer,
            search,
        }
    }

    /// Wire up the model, extractor and search provider described by `config`.
    ///
    /// A search provider that cannot be built (for example a missing API key)
    /// disables search instead of failing startup.
    pub fn from_config(config: &ParleyConfig) -> Result<Self, ChatError> {
        let llm = create_llm_client(&config.llm)?;
        let source: Arc<dyn ContentSource> = Arc::new(WebExtractor::new(&config.extractor)?);
        let summarizer = Summarizer::new(llm.clone(), source, config.summarizer.clone());

        let search = match create_search_provider(&config.search) {
            Ok(Some(provider)) => {
                log::info!("Web search enabled using {}", provider.name());
                Some(SearchService::new(
                    provider,
                    llm.clone(),
                    config.search.max_results,
                ))
            }
            Ok(None) => {
                log::info!("Web search disabled");
                None
            }
            Err(e) => {
                log::warn!("Web search disabled: {}", e);
                None
            }
        };

        Ok(Self::new(llm, config.chat.system_prompt.clone(), summarizer, search))
    }

    pub fn search_enabled(&self) -> bool {
        self.search.is_some()
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        match request {
            ChatRequest::SendText {
                user_input,
                history,
            } => self.send_text(&user_input, history).await.map(ChatReply::Chat),
            ChatRequest::Summarize { url } => self.summarize(&url).await.map(ChatReply::Summary),
            ChatRequest::Search { query } => self.search(&query).await.map(ChatReply::Search),
        }
    }

    /// Plain completion: system prompt, prior turns, then the new user message.
    pub async fn send_text(
        &self,
        user_input: &str,
        history: Vec<Message>,
    ) -> Result<Message, ChatError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system_prompt.clone()));
        // Callers may echo back their own system messages; only ours is kept
        messages.extend(history.into_iter().filter(|m| m.role != Role::System));
        messages.push(Message::user(user_input));

        let content = complete_text(self.llm.as_ref(), messages).await?;
        Ok(Message::assistant(content))
    }

    pub async fn summarize(&self, url: &str) -> Result<SummaryResult, ChatError> {
        self.summarizer.summarize(url).await
    }

    pub async fn search(&self, query: &str) -> Result<SearchReply, ChatError> {
        match &self.search {
            Some(service) => service.search(query).await,
            None => Err(ChatError::Search(SearchError::NotConfigured)),
        }
    }
}
