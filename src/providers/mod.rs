//! Provider module for Helpdesk
//!
//! This module contains the completion provider abstraction and the
//! OpenAI-compatible and Ollama implementations.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{CompletionResponse, Message, Provider, TokenUsage};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::{HelpdeskError, Result};
use std::sync::Arc;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration; `provider_type` selects the backend
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
/// (for example when the OpenAI API key variable is unset)
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
    match config.provider_type.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.openai.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.ollama.clone())?)),
        other => Err(HelpdeskError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OllamaConfig, OpenAiConfig};

    #[test]
    fn test_create_provider_invalid_type() {
        let config = ProviderConfig {
            provider_type: "invalid".to_string(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
        };

        let result = create_provider(&config);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_provider_ollama() {
        let config = ProviderConfig {
            provider_type: "ollama".to_string(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
        };

        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }
}
