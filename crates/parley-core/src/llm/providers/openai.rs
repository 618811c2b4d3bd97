use crate::config::LlmConfig;
use crate::core_types::{LLMResponse, Message, Role, Usage};
use crate::errors::ChatError;
use crate::llm::LLM;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAIClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base: OPENAI_API_BASE.to_string(),
            model,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn build_request_body(&self, messages: &[Message]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.format_messages(messages),
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = temp.into();
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }

        body
    }

    fn format_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": format_role(msg.role),
                    "content": msg.content
                })
            })
            .collect()
    }

    fn parse_response(&self, response: Value) -> Result<LLMResponse, ChatError> {
        let choices = response["choices"]
            .as_array()
            .ok_or_else(|| ChatError::ParsingError("No choices in response".to_string()))?;

        let choice = choices
            .first()
            .ok_or_else(|| ChatError::ParsingError("Empty choices array".to_string()))?;

        let content = choice["message"]["content"].as_str().map(|s| s.to_string());
        let finish_reason = choice["finish_reason"].as_str().map(|s| s.to_string());
        let usage = serde_json::from_value::<Usage>(response["usage"].clone()).ok();

        if content.is_none() {
            return Err(ChatError::ParsingError(
                "Response has no message content".to_string(),
            ));
        }

        Ok(LLMResponse {
            content,
            finish_reason,
            usage,
        })
    }
}

fn format_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl LLM for OpenAIClient {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, ChatError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request_body(&messages);

        log::debug!(
            "OpenAI API request to {} with {} messages",
            url,
            messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::LLMError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ChatError::LLMError(format!("Failed to read response: {}", e)))?;

        log::debug!("OpenAI API response ({}): {}", status, response_text);

        if !status.is_success() {
            return Err(ChatError::LLMError(format!(
                "API request failed with status {}: {}",
                status, response_text
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::ParsingError(format!("Invalid JSON response: {}", e)))?;

        self.parse_response(response_json)
    }
}

/// Create an OpenAI-compatible client from configuration, optionally against a custom base URL
pub fn create_client(
    config: &LlmConfig,
    base_url: Option<&str>,
) -> Result<Arc<dyn LLM>, ChatError> {
    let api_key = config
        .auth
        .api_key
        .clone()
        .or_else(|| {
            config
                .auth
                .api_key_env
                .as_ref()
                .and_then(|env_var| std::env::var(env_var).ok())
        })
        .ok_or_else(|| {
            ChatError::ConfigError(
                "No API key found for the LLM provider. Set api_key or api_key_env".to_string(),
            )
        })?;

    let mut client = OpenAIClient::new(api_key, config.model.clone());

    if let Some(base_url) = base_url {
        client = client.with_api_base(base_url.to_string());
    }
    if let Some(temperature) = config.parameters.temperature {
        client = client.with_temperature(temperature);
    }
    if let Some(max_tokens) = config.parameters.max_tokens.filter(|&n| n > 0) {
        client = client.with_max_tokens(max_tokens);
    }

    log::info!(
        "Created OpenAI-compatible client for model {} at {}",
        client.model,
        client.api_base
    );

    Ok(Arc::new(client))
}
