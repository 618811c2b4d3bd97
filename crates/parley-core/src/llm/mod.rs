//! Language model abstraction.
//!
//! Every remote completion goes through the [`LLM`] trait so the summarizer,
//! the search analysis and plain chat can be exercised against mocks.

pub use crate::core_types::{LLMResponse, Message};
use crate::errors::ChatError;
use async_trait::async_trait;

pub mod providers;

pub use providers::create_llm_client;

#[async_trait]
pub trait LLM: Send + Sync {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, ChatError>;
}

/// Run a completion and return its text, treating an empty reply as a parse failure.
pub async fn complete_text(llm: &dyn LLM, messages: Vec<Message>) -> Result<String, ChatError> {
    let response = llm.generate(messages).await?;
    match response.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(ChatError::ParsingError(
            "Model returned an empty response".to_string(),
        )),
    }
}
