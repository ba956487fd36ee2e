//! Configuration management for Helpdesk
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{HelpdeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Helpdesk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider configuration
    pub provider: ProviderConfig,
    /// Context retrieval configuration
    #[serde(default)]
    pub retriever: RetrieverConfig,
    /// Ticket store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Timeouts applied to every external call
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Provider configuration
///
/// Specifies which completion provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use ("openai" or "ollama")
    #[serde(rename = "type")]
    pub provider_type: String,

    /// OpenAI-compatible endpoint configuration (OpenAI, Groq, vLLM, ...)
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// OpenAI-compatible chat completions configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL, without the trailing `/chat/completions`
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Model to request
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum completion tokens
    #[serde(default = "default_max_completion_tokens")]
    pub max_tokens: u32,
}

fn default_openai_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_openai_model() -> String {
    "gemma2-9b-it".to_string()
}

fn default_openai_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    1.0
}

fn default_max_completion_tokens() -> u32 {
    1024
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_openai_model(),
            api_key_env: default_openai_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_completion_tokens(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "gemma2:9b".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Context retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// HTTP search endpoint; when unset no passages are retrieved
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Number of passages to request per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    2
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            top_k: default_top_k(),
        }
    }
}

/// Ticket store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory of the sled database; defaults to the platform data dir
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Username whose ticket collection is used
    #[serde(default = "default_username")]
    pub username: String,
}

fn default_username() -> String {
    "DefaultUser".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            username: default_username(),
        }
    }
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Token budget of the rolling window
    #[serde(default = "default_token_limit")]
    pub token_limit: usize,

    /// Seconds a session survives after its last write
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Session key used by the one-shot entry point
    #[serde(default = "default_session_key")]
    pub session_key: String,
}

fn default_token_limit() -> usize {
    3000
}

fn default_ttl_seconds() -> u64 {
    300
}

fn default_session_key() -> String {
    "DefaultSession".to_string()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            token_limit: default_token_limit(),
            ttl_seconds: default_ttl_seconds(),
            session_key: default_session_key(),
        }
    }
}

impl MemoryConfig {
    /// Session time-to-live as a `Duration`
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Per-call timeouts for external collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Intent classification completion
    #[serde(default = "default_classification_timeout")]
    pub classification_seconds: u64,

    /// Response generation completion
    #[serde(default = "default_completion_timeout")]
    pub completion_seconds: u64,

    /// Context retrieval
    #[serde(default = "default_retrieval_timeout")]
    pub retrieval_seconds: u64,

    /// Ticket store reads and writes
    #[serde(default = "default_store_timeout")]
    pub store_seconds: u64,
}

fn default_classification_timeout() -> u64 {
    30
}

fn default_completion_timeout() -> u64 {
    60
}

fn default_retrieval_timeout() -> u64 {
    15
}

fn default_store_timeout() -> u64 {
    10
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            classification_seconds: default_classification_timeout(),
            completion_seconds: default_completion_timeout(),
            retrieval_seconds: default_retrieval_timeout(),
            store_seconds: default_store_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "openai".to_string(),
                openai: OpenAiConfig::default(),
                ollama: OllamaConfig::default(),
            },
            retriever: RetrieverConfig::default(),
            store: StoreConfig::default(),
            memory: MemoryConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HelpdeskError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| HelpdeskError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("HELPDESK_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("HELPDESK_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("HELPDESK_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }

        if let Ok(ollama_host) = std::env::var("HELPDESK_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("HELPDESK_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        if let Ok(endpoint) = std::env::var("HELPDESK_RETRIEVER_ENDPOINT") {
            tracing::debug!(endpoint = %endpoint, "Env override: HELPDESK_RETRIEVER_ENDPOINT");
            self.retriever.endpoint = Some(endpoint);
        }

        if let Ok(top_k) = std::env::var("HELPDESK_TOP_K") {
            if let Ok(value) = top_k.parse() {
                self.retriever.top_k = value;
            } else {
                tracing::warn!("Invalid HELPDESK_TOP_K: {}", top_k);
            }
        }

        if let Ok(store_path) = std::env::var("HELPDESK_STORE_PATH") {
            self.store.path = Some(PathBuf::from(store_path));
        }

        if let Ok(username) = std::env::var("HELPDESK_USERNAME") {
            self.store.username = username;
        }

        if let Ok(limit) = std::env::var("HELPDESK_MEMORY_TOKEN_LIMIT") {
            if let Ok(value) = limit.parse() {
                self.memory.token_limit = value;
            } else {
                tracing::warn!("Invalid HELPDESK_MEMORY_TOKEN_LIMIT: {}", limit);
            }
        }

        if let Ok(ttl) = std::env::var("HELPDESK_MEMORY_TTL_SECONDS") {
            if let Ok(value) = ttl.parse() {
                self.memory.ttl_seconds = value;
            } else {
                tracing::warn!("Invalid HELPDESK_MEMORY_TTL_SECONDS: {}", ttl);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.store_path {
            tracing::debug!("Using store path override from CLI: {}", path.display());
            self.store.path = Some(path.clone());
        }

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(HelpdeskError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(HelpdeskError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.retriever.top_k == 0 {
            return Err(
                HelpdeskError::Config("retriever.top_k must be greater than 0".to_string()).into(),
            );
        }

        if self.store.username.trim().is_empty() {
            return Err(
                HelpdeskError::Config("store.username cannot be empty".to_string()).into(),
            );
        }

        if self.memory.token_limit == 0 {
            return Err(HelpdeskError::Config(
                "memory.token_limit must be greater than 0".to_string(),
            )
            .into());
        }

        if self.memory.ttl_seconds == 0 {
            return Err(HelpdeskError::Config(
                "memory.ttl_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        let timeouts = [
            ("classification_seconds", self.timeouts.classification_seconds),
            ("completion_seconds", self.timeouts.completion_seconds),
            ("retrieval_seconds", self.timeouts.retrieval_seconds),
            ("store_seconds", self.timeouts.store_seconds),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(HelpdeskError::Config(format!(
                    "timeouts.{} must be greater than 0",
                    name
                ))
                .into());
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, "openai");
        assert_eq!(config.provider.openai.model, "gemma2-9b-it");
        assert_eq!(config.retriever.top_k, 2);
        assert_eq!(config.store.username, "DefaultUser");
        assert_eq!(config.memory.token_limit, 3000);
        assert_eq!(config.memory.ttl_seconds, 300);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_provider() {
        let mut config = Config::default();
        config.provider.provider_type = "copilot".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_top_k() {
        let mut config = Config::default();
        config.retriever.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_blank_username() {
        let mut config = Config::default();
        config.store.username = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.timeouts.store_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store_seconds"));
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  type: ollama
  ollama:
    host: http://gpu-box:11434
    model: llama3.2:latest
retriever:
  endpoint: http://localhost:8088/search
  top_k: 4
store:
  username: alice
memory:
  token_limit: 1500
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.provider.ollama.host, "http://gpu-box:11434");
        assert_eq!(
            config.retriever.endpoint.as_deref(),
            Some("http://localhost:8088/search")
        );
        assert_eq!(config.retriever.top_k, 4);
        assert_eq!(config.store.username, "alice");
        assert_eq!(config.memory.token_limit, 1500);
        assert_eq!(config.memory.ttl_seconds, 300);
        assert_eq!(config.timeouts.completion_seconds, 60);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.store.username, "DefaultUser");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("HELPDESK_USERNAME", "bob");
        std::env::set_var("HELPDESK_TOP_K", "5");
        std::env::set_var("HELPDESK_MEMORY_TTL_SECONDS", "not-a-number");

        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();

        std::env::remove_var("HELPDESK_USERNAME");
        std::env::remove_var("HELPDESK_TOP_K");
        std::env::remove_var("HELPDESK_MEMORY_TTL_SECONDS");

        assert_eq!(config.store.username, "bob");
        assert_eq!(config.retriever.top_k, 5);
        assert_eq!(config.memory.ttl_seconds, 300);
    }

    #[test]
    #[serial]
    fn test_cli_store_path_override() {
        let cli = crate::cli::Cli {
            store_path: Some(PathBuf::from("/tmp/helpdesk-store")),
            ..crate::cli::Cli::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/helpdesk-store")));
    }
}
