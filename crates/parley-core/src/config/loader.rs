//! Configuration loader for YAML files and environment resolution
//!
//! This module handles loading configuration from YAML files and resolving
//! API keys from environment variables and `.env`-style files.

use std::env;
use std::path::Path;
use tokio::fs;

use crate::config::types::*;
use crate::errors::ChatError;

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<ParleyConfig, ChatError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            ChatError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content)
    }

    /// Load configuration from a file when it exists, otherwise start from defaults
    pub async fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<ParleyConfig, ChatError> {
        let path = path.as_ref();
        if fs::try_exists(path).await.unwrap_or(false) {
            log::info!("Loading configuration from file: {}", path.display());
            Self::from_file(path).await
        } else {
            log::info!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            Self::finalize(ParleyConfig::default())
        }
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<ParleyConfig, ChatError> {
        // An empty document deserializes to unit, not to an empty mapping
        let config: ParleyConfig = if content.trim().is_empty() {
            ParleyConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| {
                ChatError::ConfigError(format!("Failed to parse YAML config: {}", e))
            })?
        };

        Self::finalize(config)
    }

    fn finalize(mut config: ParleyConfig) -> Result<ParleyConfig, ChatError> {
        Self::resolve_environment(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve environment variables in the configuration
    fn resolve_environment(config: &mut ParleyConfig) -> Result<(), ChatError> {
        for env_file in &config.environment.env_files {
            if env_file.exists() {
                Self::load_env_file(env_file)?;
            }
        }

        Self::resolve_llm_auth(&mut config.llm.auth);
        Self::resolve_search_auth(&mut config.search);
        Ok(())
    }

    /// Load KEY=VALUE pairs into the process environment
    fn load_env_file<P: AsRef<Path>>(path: P) -> Result<(), ChatError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ChatError::ConfigError(format!(
                "Failed to read env file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                // Values already exported by the shell take precedence
                if env::var_os(key).is_none() {
                    env::set_var(key, value);
                }
            }
        }

        Ok(())
    }

    fn resolve_llm_auth(auth: &mut LlmAuth) {
        if auth.api_key.is_some() {
            return;
        }
        if let Some(env_var) = &auth.api_key_env {
            if let Ok(api_key) = env::var(env_var) {
                auth.api_key = Some(api_key);
            }
        }
    }

    fn resolve_search_auth(search: &mut SearchConfig) {
        if search.auth.api_key.is_some() {
            return;
        }
        let env_var = search.auth.api_key_env.clone().or_else(|| match search.provider {
            SearchProviderKind::DuckDuckGo => None,
            SearchProviderKind::Tavily => Some("TAVILY_API_KEY".to_string()),
            SearchProviderKind::Serper => Some("SERPER_API_KEY".to_string()),
        });
        if let Some(env_var) = env_var {
            if let Ok(api_key) = env::var(&env_var) {
                search.auth.api_key = Some(api_key);
            }
        }
    }
}
