//! Search API clients.
//!
//! DuckDuckGo's instant answer API needs no key but only returns topic
//! summaries; Tavily and Serper return real web results and need an API key.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::time::Duration;

use super::{SearchError, SearchProvider};
use crate::core_types::SearchResult;

const USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn request_error(provider: &str, err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        SearchError::Request {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }
}

async fn read_json(provider: &str, response: reqwest::Response) -> Result<Value, SearchError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SearchError::ApiError {
            provider: provider.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    response.json().await.map_err(|e| SearchError::Parse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Host part of a URL, used as the result's source label.
fn source_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .host_str()
                .map(|host| host.trim_start_matches("www.").to_string())
        })
        .unwrap_or_else(|| url.to_string())
}

pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            endpoint: "https://api.duckduckgo.com/".to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten an instant answer payload into results.
pub fn parse_duckduckgo(data: &Value, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if let (Some(text), Some(url)) = (data["AbstractText"].as_str(), data["AbstractURL"].as_str()) {
        if !text.is_empty() && !url.is_empty() {
            results.push(SearchResult {
                title: data["Heading"].as_str().unwrap_or(text).to_string(),
                url: url.to_string(),
                description: text.to_string(),
                source: data["AbstractSource"]
                    .as_str()
                    .filter(|source| !source.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| source_of(url)),
                published_at: None,
            });
        }
    }

    // Topic groups nest their entries one level down
    let topics = data["RelatedTopics"].as_array().cloned().unwrap_or_default();
    let flattened = topics.iter().flat_map(|topic| match topic["Topics"].as_array() {
        Some(nested) => nested.clone(),
        None => vec![topic.clone()],
    });

    for topic in flattened {
        if results.len() >= max_results {
            break;
        }
        if let (Some(text), Some(url)) = (topic["Text"].as_str(), topic["FirstURL"].as_str()) {
            if text.is_empty() {
                continue;
            }
            let title = text.split(" - ").next().unwrap_or(text);
            results.push(SearchResult {
                title: title.to_string(),
                url: url.to_string(),
                description: text.to_string(),
                source: "DuckDuckGo".to_string(),
                published_at: None,
            });
        }
    }

    results.truncate(max_results);
    results
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!(
            "{}?q={}&format=json&no_html=1&skip_disambig=1",
            self.endpoint,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error("DuckDuckGo", e))?;

        let data = read_json("DuckDuckGo", response).await?;
        Ok(parse_duckduckgo(&data, max_results))
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

pub struct TavilyProvider {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl TavilyProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            api_key,
            endpoint: "https://api.tavily.com/search".to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

pub fn parse_tavily(data: &Value, max_results: usize) -> Vec<SearchResult> {
    data["results"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let title = item["title"].as_str()?;
                    let url = item["url"].as_str()?;
                    Some(SearchResult {
                        title: title.to_string(),
                        url: url.to_string(),
                        description: item["content"].as_str().unwrap_or_default().to_string(),
                        source: source_of(url),
                        published_at: item["published_date"].as_str().map(str::to_string),
                    })
                })
                .take(max_results)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let payload = json!({
            "api_key": self.api_key,
            "query": query,
            "search_depth": "basic",
            "include_answer": false,
            "include_images": false,
            "include_raw_content": false,
            "max_results": max_results
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| request_error("Tavily", e))?;

        let data = read_json("Tavily", response).await?;
        Ok(parse_tavily(&data, max_results))
    }

    fn name(&self) -> &'static str {
        "tavily"
    }
}

pub struct SerperProvider {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl SerperProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            api_key,
            endpoint: "https://google.serper.dev/search".to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

pub fn parse_serper(data: &Value, max_results: usize) -> Vec<SearchResult> {
    data["organic"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let title = item["title"].as_str()?;
                    let link = item["link"].as_str()?;
                    Some(SearchResult {
                        title: title.to_string(),
                        url: link.to_string(),
                        description: item["snippet"].as_str().unwrap_or_default().to_string(),
                        source: source_of(link),
                        published_at: item["date"].as_str().map(str::to_string),
                    })
                })
                .take(max_results)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SearchProvider for SerperProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let payload = json!({
            "q": query,
            "num": max_results
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| request_error("Serper", e))?;

        let data = read_json("Serper", response).await?;
        Ok(parse_serper(&data, max_results))
    }

    fn name(&self) -> &'static str {
        "serper"
    }
}
