//! URL summarization.
//!
//! Three paths, all producing a [`SummaryResult`]:
//! - URL-only: sites matching a configured pattern are summarized from the URL alone
//! - extracted: page text, truncated to the character budget, is summarized
//! - fallback: when extraction fails the model guesses from the URL and the reply says so

use std::sync::Arc;

use crate::config::SummarizerConfig;
use crate::core_types::{Message, Role, SummaryResult};
use crate::errors::ChatError;
use crate::extractor::ContentSource;
use crate::llm::{complete_text, LLM};

const URL_ONLY_SYSTEM_PROMPT: &str = "You are a helpful assistant that can analyze and summarize news articles based on their URLs. You specialize in regional news sources, including Vietnamese-language content.";
const CONTENT_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes web content concisely and accurately. Focus on the main points and key information.";
const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful assistant that can analyze web content based on URLs.";

pub const URL_ONLY_NOTE: &str = "*(Note: This summary is based on the URL pattern and typical content structure of this news source. For the full article details, please visit the link directly.)*";
pub const FALLBACK_NOTE: &str = "*(Note: This is a general summary as I couldn't access the specific content directly. For the full article, please visit the URL.)*";

pub struct Summarizer {
    llm: Arc<dyn LLM>,
    source: Arc<dyn ContentSource>,
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(
        llm: Arc<dyn LLM>,
        source: Arc<dyn ContentSource>,
        config: SummarizerConfig,
    ) -> Self {
        Self {
            llm,
            source,
            config,
        }
    }

    pub async fn summarize(&self, url: &str) -> Result<SummaryResult, ChatError> {
        let content = self
            .summarize_inner(url)
            .await
            .map_err(|e| ChatError::Summarize(e.to_string()))?;

        Ok(SummaryResult {
            role: Role::Assistant,
            content,
            source_url: url.to_string(),
        })
    }

    async fn summarize_inner(&self, url: &str) -> Result<String, ChatError> {
        if self.is_url_only(url) {
            log::info!("Summarizing {} from its URL alone", url);
            let messages = vec![
                Message::system(URL_ONLY_SYSTEM_PROMPT),
                Message::user(format!(
                    "I'd like a summary of this news article: {}. The article is from a news site whose pages cannot be read directly. Please provide a comprehensive summary based on the URL, discussing what this article likely contains.",
                    url
                )),
            ];
            let summary = complete_text(self.llm.as_ref(), messages).await?;
            return Ok(format!("{}\n\n{}", summary, URL_ONLY_NOTE));
        }

        match self.source.extract(url).await {
            Ok(text) => {
                let truncated = truncate_chars(&text, self.config.max_content_chars);
                let messages = vec![
                    Message::system(CONTENT_SYSTEM_PROMPT),
                    Message::user(format!(
                        "Please summarize the following content from {}:\n\n{}",
                        url, truncated
                    )),
                ];
                complete_text(self.llm.as_ref(), messages).await
            }
            Err(e) => {
                log::warn!(
                    "Direct extraction failed for {}, using general summary approach: {}",
                    url,
                    e
                );
                let messages = vec![
                    Message::system(FALLBACK_SYSTEM_PROMPT),
                    Message::user(format!(
                        "I need information about this URL: {}. Please provide a summary of what you think this page might contain based on the URL structure and your knowledge.",
                        url
                    )),
                ];
                let summary = complete_text(self.llm.as_ref(), messages).await?;
                Ok(format!("{}\n\n{}", summary, FALLBACK_NOTE))
            }
        }
    }

    fn is_url_only(&self, url: &str) -> bool {
        self.config
            .url_only_patterns
            .iter()
            .any(|pattern| url.contains(pattern.as_str()))
    }
}

/// Keep at most `max_chars` characters, marking a cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
