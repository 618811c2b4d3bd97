//! Configuration type definitions for the chat backend
//!
//! Every section is optional in YAML and falls back to the defaults the
//! service was designed around, so an empty file (or no file at all) yields a
//! working configuration as long as an API key is available in the environment.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::ChatError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    /// Base URL of an OpenAI-compatible endpoint, required for `custom`
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub parameters: ModelParameters,
    #[serde(default)]
    pub auth: LlmAuth,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: None,
            model: default_model(),
            parameters: ModelParameters::default(),
            auth: LlmAuth::default(),
        }
    }
}

/// LLM provider types
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAI,
    Custom,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuth {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: Option<String>,
}

impl Default for LlmAuth {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_llm_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Character budget for extracted page text sent to the model
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// URL fragments for sites that are summarized from the URL alone
    #[serde(default = "default_url_only_patterns")]
    pub url_only_patterns: Vec<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_content_chars: default_max_content_chars(),
            url_only_patterns: default_url_only_patterns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_extractor_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_extractor_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            referer: default_referer(),
            accept_language: default_accept_language(),
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub provider: SearchProviderKind,
    #[serde(default)]
    pub auth: SearchAuth,
    #[serde(default = "default_max_search_results")]
    pub max_results: usize,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: SearchProviderKind::default(),
            auth: SearchAuth::default(),
            max_results: default_max_search_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

/// Web search providers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    #[default]
    DuckDuckGo,
    Tavily,
    Serper,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchAuth {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_env_files")]
    pub env_files: Vec<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            env_files: default_env_files(),
        }
    }
}

impl ParleyConfig {
    pub fn validate(&self) -> Result<(), ChatError> {
        if self.llm.model.trim().is_empty() {
            return Err(ChatError::ConfigError("LLM model cannot be empty".to_string()));
        }

        if self.llm.provider == LlmProvider::Custom {
            let base_url = self.llm.base_url.as_deref().unwrap_or_default();
            if base_url.trim().is_empty() {
                return Err(ChatError::ConfigError(
                    "Custom provider requires a valid 'base_url'".to_string(),
                ));
            }
        }

        if self.summarizer.max_content_chars == 0 {
            return Err(ChatError::ConfigError(
                "Summarizer max_content_chars must be greater than 0".to_string(),
            ));
        }

        if self.extractor.timeout_secs == 0 {
            return Err(ChatError::ConfigError(
                "Extractor timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.search.enabled && self.search.max_results == 0 {
            return Err(ChatError::ConfigError(
                "Search max_results must be greater than 0".to_string(),
            ));
        }

        if self.search.enabled && self.search.timeout_secs == 0 {
            return Err(ChatError::ConfigError(
                "Search timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| {
                ChatError::ConfigError(format!(
                    "Invalid bind address '{}': {}",
                    self.server.bind_addr, e
                ))
            })?;

        Ok(())
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_llm_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_max_content_chars() -> usize {
    15_000
}

fn default_url_only_patterns() -> Vec<String> {
    vec!["vnexpress.net".to_string(), ".vn/".to_string()]
}

fn default_extractor_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_referer() -> String {
    "https://www.google.com/".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.5".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_search_results() -> usize {
    5
}

fn default_search_timeout() -> u64 {
    30
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_env_files() -> Vec<PathBuf> {
    vec![PathBuf::from(".env")]
}
