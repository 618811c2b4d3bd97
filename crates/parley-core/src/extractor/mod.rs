//! Web page content extraction.
//!
//! [`WebExtractor`] fetches a page with browser-like headers and hands the
//! markup to [`extract_text`]. Callers depend on the [`ContentSource`] trait so
//! the summarizer can be tested without a network.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::ExtractorConfig;

pub mod html;

pub use html::extract_text;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The server answered with a non-success status
    #[error("Failed to extract content: Server responded with status {0}")]
    HttpStatus(u16),
    /// The request was sent but nothing usable came back
    #[error("Failed to extract content: No response received from the server")]
    NoResponse(String),
    /// The request could not be built or sent
    #[error("Failed to extract content: {0}")]
    Setup(String),
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch `url` and return its readable text.
    async fn extract(&self, url: &str) -> Result<String, ExtractionError>;
}

pub struct WebExtractor {
    client: Client,
}

impl WebExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractionError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| ExtractionError::Setup(format!("Invalid Accept-Language: {}", e)))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.referer)
                .map_err(|e| ExtractionError::Setup(format!("Invalid Referer: {}", e)))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ExtractionError::Setup(e.to_string()))?;

        Ok(Self { client })
    }

    fn map_send_error(url: &str, err: reqwest::Error) -> ExtractionError {
        if err.is_builder() {
            ExtractionError::Setup(err.to_string())
        } else if let Some(status) = err.status() {
            ExtractionError::HttpStatus(status.as_u16())
        } else {
            log::debug!("No response from {}: {}", url, err);
            ExtractionError::NoResponse(err.to_string())
        }
    }
}

#[async_trait]
impl ContentSource for WebExtractor {
    async fn extract(&self, url: &str) -> Result<String, ExtractionError> {
        log::debug!("Fetching content from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_send_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::NoResponse(e.to_string()))?;

        let text = extract_text(&body);
        log::info!("Extracted {} chars from: {}", text.chars().count(), url);
        Ok(text)
    }
}
