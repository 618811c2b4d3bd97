//! Transport between the terminal client and the Parley server.

use anyhow::{bail, Result};
use async_trait::async_trait;
use parley_core::{Message, SearchReply, SummaryResult};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// The three server endpoints the dispatcher routes to.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_text(&self, user_input: &str, history: &[Message]) -> Result<Message>;

    async fn summarize(&self, url: &str) -> Result<SummaryResult>;

    async fn search(&self, query: &str) -> Result<SearchReply>;
}

/// HTTP client for a running Parley server
pub struct HttpChatBackend {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChatBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health_check(&self) -> Result<()> {
        let health_url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&health_url)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Health check failed: {}", response.status());
        }

        Ok(())
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", path, status, text);
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_text(&self, user_input: &str, history: &[Message]) -> Result<Message> {
        self.post(
            "/sendText",
            json!({ "userInput": user_input, "history": history }),
        )
        .await
    }

    async fn summarize(&self, url: &str) -> Result<SummaryResult> {
        self.post("/summarize", json!({ "url": url })).await
    }

    async fn search(&self, query: &str) -> Result<SearchReply> {
        self.post("/search", json!({ "query": query })).await
    }
}
