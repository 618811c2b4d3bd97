//! LLM provider implementations
//!
//! Both supported providers speak the OpenAI chat-completions protocol; a
//! custom provider only swaps the base URL.

use std::sync::Arc;

use crate::config::{LlmConfig, LlmProvider};
use crate::errors::ChatError;
use crate::llm::LLM;

pub mod openai;

pub use openai::OpenAIClient;

/// Create an LLM client based on the provider configuration
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LLM>, ChatError> {
    match config.provider {
        LlmProvider::OpenAI => openai::create_client(config, None),
        LlmProvider::Custom => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                ChatError::ConfigError("Custom provider requires a valid 'base_url'".to_string())
            })?;
            openai::create_client(config, Some(base_url))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmAuth;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = LlmConfig {
            auth: LlmAuth {
                api_key: None,
                api_key_env: Some("PARLEY_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
            },
            ..LlmConfig::default()
        };
        let err = create_llm_client(&config).err().unwrap();
        assert!(matches!(err, ChatError::ConfigError(_)));
    }

    #[test]
    fn test_custom_provider_requires_base_url() {
        let config = LlmConfig {
            provider: LlmProvider::Custom,
            auth: LlmAuth {
                api_key: Some("k".to_string()),
                api_key_env: None,
            },
            ..LlmConfig::default()
        };
        assert!(create_llm_client(&config).is_err());

        let config = LlmConfig {
            base_url: Some("http://localhost:11434/v1".to_string()),
            ..config
        };
        assert!(create_llm_client(&config).is_ok());
    }
}
