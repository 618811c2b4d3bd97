//! Core type definitions exchanged between the chat client, the server and the model
//!
//! These are the wire shapes of the HTTP API as well as the message format
//! handed to language model providers. Field names follow the camelCase JSON
//! contract the browser and terminal clients already speak.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// Usage statistics reported by OpenAI-compatible providers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMResponse {
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Result of summarizing a single URL.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub role: Role,
    pub content: String,
    pub source_url: String,
}

/// A single web search hit, in the shape the chat client renders.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchReply {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchResult>>,
}

/// Reply produced for one chat turn.
///
/// Serialized untagged so each variant keeps the exact JSON shape of its endpoint.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatReply {
    Chat(Message),
    Summary(SummaryResult),
    Search(SearchReply),
}

impl ChatReply {
    pub fn content(&self) -> &str {
        match self {
            ChatReply::Chat(message) => &message.content,
            ChatReply::Summary(summary) => &summary.content,
            ChatReply::Search(reply) => &reply.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serializes_lowercase() {
        let message = Message::assistant("hi");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn test_summary_uses_camel_case() {
        let summary = SummaryResult {
            role: Role::Assistant,
            content: "short".to_string(),
            source_url: "https://example.com".to_string(),
        };
        let value = serde_json::to_value(ChatReply::Summary(summary)).unwrap();
        assert_eq!(value["sourceUrl"], "https://example.com");
        assert_eq!(value["role"], "assistant");
    }

    #[test]
    fn test_search_reply_omits_missing_results() {
        let reply = SearchReply {
            role: Role::Assistant,
            content: "nothing".to_string(),
            search_results: None,
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert!(value.get("searchResults").is_none());

        let parsed: SearchReply = serde_json::from_value(json!({
            "role": "assistant",
            "content": "found",
            "searchResults": [{
                "title": "T",
                "url": "https://t.example",
                "description": "D",
                "source": "duckduckgo",
                "publishedAt": "2024-01-01"
            }]
        }))
        .unwrap();
        let results = parsed.search_results.unwrap();
        assert_eq!(results[0].published_at.as_deref(), Some("2024-01-01"));
    }
}
