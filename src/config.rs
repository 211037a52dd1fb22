//! Configuration management for Jarvis
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Provider secrets are normally supplied through the environment (or a
//! `.env` file) rather than the YAML file.

use crate::credentials::discover_credentials;
use crate::error::{JarvisError, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Jarvis
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Web search settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Context retrieval and vector index settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Chat session settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// On-disk locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Assistant persona
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Retry policy applied to every remote call
    #[serde(default)]
    pub retry: RetryConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// LLM provider configuration (Groq, OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the chat completions API
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Credential pool, in rotation order. Usually filled from
    /// `GROQ_API_KEY`, `GROQ_API_KEY_2`, ... rather than the file.
    #[serde(default, skip_serializing)]
    pub api_keys: Vec<String>,

    /// Request timeout for a single completion call (seconds)
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

fn default_llm_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            model: default_llm_model(),
            api_keys: Vec::new(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

/// Web search configuration (Tavily)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search API
    #[serde(default = "default_search_api_base")]
    pub api_base: String,

    /// Search credential; realtime chat runs without search when unset
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum number of hits folded into the prompt
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,

    /// Request timeout for a single search call (seconds)
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,
}

fn default_search_api_base() -> String {
    "https://api.tavily.com".to_string()
}

fn default_search_max_results() -> usize {
    5
}

fn default_search_timeout() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base: default_search_api_base(),
            api_key: None,
            max_results: default_search_max_results(),
            timeout_seconds: default_search_timeout(),
        }
    }
}

/// Context retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per query
    #[serde(default = "default_k")]
    pub k: usize,

    /// Maximum characters per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Embedding backend
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_k() -> usize {
    10
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend: "hashing" (local, default) or "ollama"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Vector size for the hashing embedder
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// Ollama server host (when provider is "ollama")
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,

    /// Ollama embedding model (when provider is "ollama")
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
}

fn default_embedding_provider() -> String {
    "hashing".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "all-minilm".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            dimensions: default_embedding_dimensions(),
            ollama_host: default_ollama_host(),
            ollama_model: default_ollama_model(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of user/assistant pairs sent to the model with each request
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    /// Maximum accepted message length in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

fn default_max_history_turns() -> usize {
    20
}

fn default_max_message_length() -> usize {
    32_000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_history_turns: default_max_history_turns(),
            max_message_length: default_max_message_length(),
        }
    }
}

/// On-disk locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding `learning_data/` and `chats_data/`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("database")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Directory of `*.txt` files ingested into the vector index
    pub fn learning_data_dir(&self) -> PathBuf {
        self.data_dir.join("learning_data")
    }

    /// Directory of persisted chat sessions
    pub fn chats_data_dir(&self) -> PathBuf {
        self.data_dir.join("chats_data")
    }
}

/// Assistant persona configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Name the assistant uses for itself
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Optional form of address for the user
    #[serde(default)]
    pub user_title: Option<String>,
}

fn default_assistant_name() -> String {
    "Jarvis".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            user_title: None,
        }
    }
}

/// Retry configuration shared by provider and search calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per credential, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (seconds); doubles afterwards
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> f64 {
    1.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_secs: default_initial_delay(),
        }
    }
}

impl RetryConfig {
    /// Convert to the policy used by [`crate::retry::with_retry`]
    ///
    /// A delay that is not a representable duration becomes zero; `validate`
    /// rejects such values before startup.
    pub fn policy(&self) -> RetryPolicy {
        let delay = Duration::try_from_secs_f64(self.initial_delay_secs).unwrap_or(Duration::ZERO);
        RetryPolicy::new(self.max_attempts, delay)
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
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| JarvisError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| JarvisError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// Split out from the process environment so tests can feed a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let keys = discover_credentials("GROQ_API_KEY", &lookup);
        if !keys.is_empty() {
            tracing::debug!("Discovered {} LLM credential(s) from environment", keys.len());
            self.llm.api_keys = keys;
        }

        if let Some(model) = non_empty("GROQ_MODEL") {
            self.llm.model = model;
        }

        if let Some(key) = non_empty("TAVILY_API_KEY") {
            self.search.api_key = Some(key);
        }

        if let Some(name) = non_empty("ASSISTANT_NAME") {
            self.assistant.name = name;
        }

        if let Some(title) = non_empty("JARVIS_USER_TITLE") {
            self.assistant.user_title = Some(title);
        }

        if let Some(host) = non_empty("JARVIS_HOST") {
            self.server.host = host;
        }

        if let Some(port) = non_empty("JARVIS_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid JARVIS_PORT: {}", port);
            }
        }

        if let Some(dir) = non_empty("JARVIS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let crate::cli::Commands::Serve { host, port } = &cli.command {
            if let Some(host) = host {
                self.server.host = host.clone();
            }
            if let Some(port) = port {
                self.server.port = *port;
            }
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set. Credential presence is
    /// checked at service startup, not here, so offline commands still work.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        for (name, base) in [
            ("llm.api_base", &self.llm.api_base),
            ("search.api_base", &self.search.api_base),
            ("retrieval.embedding.ollama_host", &self.retrieval.embedding.ollama_host),
        ] {
            url::Url::parse(base).map_err(|e| {
                JarvisError::Config(format!("{} is not a valid URL ({}): {}", name, base, e))
            })?;
        }

        if self.llm.model.trim().is_empty() {
            return Err(JarvisError::Config("llm.model cannot be empty".to_string()).into());
        }

        if self.llm.timeout_seconds == 0 || self.search.timeout_seconds == 0 {
            return Err(
                JarvisError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.search.max_results == 0 {
            return Err(JarvisError::Config(
                "search.max_results must be greater than 0".to_string(),
            )
            .into());
        }

        if self.retrieval.k == 0 {
            return Err(
                JarvisError::Config("retrieval.k must be greater than 0".to_string()).into(),
            );
        }

        if self.retrieval.chunk_size == 0 {
            return Err(JarvisError::Config(
                "retrieval.chunk_size must be greater than 0".to_string(),
            )
            .into());
        }

        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            return Err(JarvisError::Config(
                "retrieval.chunk_overlap must be smaller than retrieval.chunk_size".to_string(),
            )
            .into());
        }

        let valid_embedders = ["hashing", "ollama"];
        if !valid_embedders.contains(&self.retrieval.embedding.provider.as_str()) {
            return Err(JarvisError::Config(format!(
                "Invalid embedding provider: {}. Must be one of: {}",
                self.retrieval.embedding.provider,
                valid_embedders.join(", ")
            ))
            .into());
        }

        if self.retrieval.embedding.dimensions == 0 {
            return Err(JarvisError::Config(
                "retrieval.embedding.dimensions must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.max_message_length == 0 {
            return Err(JarvisError::Config(
                "chat.max_message_length must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.max_history_turns > 1000 {
            return Err(JarvisError::Config(
                "chat.max_history_turns must be less than or equal to 1000".to_string(),
            )
            .into());
        }

        if self.retry.max_attempts == 0 {
            return Err(
                JarvisError::Config("retry.max_attempts must be greater than 0".to_string())
                    .into(),
            );
        }

        if let Err(e) = Duration::try_from_secs_f64(self.retry.initial_delay_secs) {
            return Err(JarvisError::Config(format!(
                "retry.initial_delay_secs must be a non-negative duration ({}): {}",
                self.retry.initial_delay_secs, e
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.retrieval.k, 10);
        assert_eq!(config.chat.max_history_turns, 20);
        assert_eq!(config.chat.max_message_length, 32_000);
        assert_eq!(config.assistant.name, "Jarvis");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_api_base() {
        let mut config = Config::default();
        config.llm.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_overlap_not_smaller_than_chunk() {
        let mut config = Config::default();
        config.retrieval.chunk_overlap = config.retrieval.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_embedder() {
        let mut config = Config::default();
        config.retrieval.embedding.provider = "faiss".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_limits() {
        let mut config = Config::default();
        config.retrieval.k = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unrepresentable_retry_delay() {
        for delay in [1e20, -1.0, f64::NAN, f64::INFINITY] {
            let mut config = Config::default();
            config.retry.initial_delay_secs = delay;
            assert!(config.validate().is_err(), "{} should be rejected", delay);
            assert_eq!(config.retry.policy().initial_delay, Duration::ZERO);
        }

        let mut config = Config::default();
        config.retry.initial_delay_secs = 0.5;
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.policy().initial_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
server:
  host: 127.0.0.1
  port: 9000
llm:
  model: llama-3.1-8b-instant
retrieval:
  k: 4
  chunk_size: 500
  chunk_overlap: 50
chat:
  max_history_turns: 6
storage:
  data_dir: /var/lib/jarvis
retry:
  max_attempts: 5
  initial_delay_secs: 0.5
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.retrieval.k, 4);
        assert_eq!(config.chat.max_history_turns, 6);
        assert_eq!(config.chat.max_message_length, 32_000);
        assert_eq!(
            config.storage.chats_data_dir(),
            PathBuf::from("/var/lib/jarvis/chats_data")
        );
        assert_eq!(
            config.retry.policy(),
            RetryPolicy::new(5, Duration::from_millis(500))
        );
    }

    #[test]
    fn test_api_keys_are_not_serialized() {
        let mut config = Config::default();
        config.llm.api_keys = vec!["gsk_secret".to_string()];
        config.search.api_key = Some("tvly_secret".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("gsk_secret"));
        assert!(!yaml.contains("tvly_secret"));
    }

    #[test]
    fn test_apply_env_discovers_credential_pool() {
        let mut config = Config::default();
        config.apply_env(lookup_from(&[
            ("GROQ_API_KEY", "key-one"),
            ("GROQ_API_KEY_2", "key-two"),
            ("GROQ_API_KEY_4", "key-four"),
            ("TAVILY_API_KEY", "tvly-key"),
            ("ASSISTANT_NAME", "Friday"),
            ("JARVIS_PORT", "8123"),
        ]));

        assert_eq!(config.llm.api_keys, vec!["key-one", "key-two"]);
        assert_eq!(config.search.api_key.as_deref(), Some("tvly-key"));
        assert_eq!(config.assistant.name, "Friday");
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_apply_env_ignores_blank_and_invalid_values() {
        let mut config = Config::default();
        config.apply_env(lookup_from(&[
            ("TAVILY_API_KEY", "   "),
            ("JARVIS_PORT", "eighty"),
            ("ASSISTANT_NAME", ""),
        ]));

        assert!(config.search.api_key.is_none());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.assistant.name, "Jarvis");
    }

    #[test]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli {
            config: None,
            verbose: false,
            command: crate::cli::Commands::Serve {
                host: Some("127.0.0.1".to_string()),
                port: Some(7000),
            },
        };

        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7000);
    }
}
