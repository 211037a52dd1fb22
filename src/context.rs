//! Application context: service wiring, startup and shutdown
//!
//! [`AppContext::startup`] builds every service in dependency order and
//! fails before anything is served if the configuration is invalid, no LLM
//! credential is available, or the index cannot be built.

use crate::config::Config;
use crate::credentials::CredentialPool;
use crate::error::Result;
use crate::invoker::LlmInvoker;
use crate::orchestrator::{ChatService, ChatSettings};
use crate::prompts::persona_prompt::generate_persona_prompt;
use crate::providers::create_provider;
use crate::retrieval::ContextRetriever;
use crate::search::SearchAugmenter;
use crate::session::SessionStore;

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Snapshot of service readiness for the health endpoint
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Always "healthy" once the context exists
    pub status: String,
    /// Vector index built
    pub vector_store: bool,
    /// LLM invoker ready
    pub llm: bool,
    /// Realtime search credential configured
    pub realtime: bool,
    /// Chat service ready
    pub chat: bool,
    /// Number of LLM credentials in rotation
    pub credentials: usize,
    /// Seconds since startup
    pub uptime_secs: u64,
}

/// Shared services for the lifetime of the process
#[derive(Clone)]
pub struct AppContext {
    /// Effective configuration
    pub config: Arc<Config>,
    /// Chat orchestration
    pub chat: Arc<ChatService>,
    /// Startup instant for uptime reporting
    pub started_at: Instant,
}

impl AppContext {
    /// Build every service from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, no LLM credential
    /// is configured, or the vector index cannot be built
    pub async fn startup(config: Config) -> Result<Self> {
        config.validate()?;
        tracing::info!("Starting {}...", config.assistant.name);

        let pool = CredentialPool::new("groq", &config.llm.api_keys)?;
        let provider = create_provider(&config.llm)?;
        let retry = config.retry.policy();
        let invoker = Arc::new(LlmInvoker::new(provider, pool, retry));

        tracing::info!("Initializing vector store...");
        let retriever = ContextRetriever::from_corpus(&config.retrieval, &config.storage).await?;
        tracing::info!(
            "Vector store initialized ({} chunks)",
            retriever.indexed_chunks()
        );

        let search = SearchAugmenter::from_config(&config.search, retry)?;
        let sessions = Arc::new(SessionStore::new(config.storage.chats_data_dir()));
        let persona = generate_persona_prompt(
            &config.assistant.name,
            config.assistant.user_title.as_deref(),
        );

        let chat = ChatService::new(
            sessions,
            retriever,
            search,
            invoker,
            persona,
            ChatSettings::from_config(&config),
        );

        tracing::info!("{} is online and ready", config.assistant.name);
        Ok(Self::from_service(config, chat))
    }

    /// Wrap an already assembled chat service
    pub fn from_service(config: Config, chat: ChatService) -> Self {
        Self {
            config: Arc::new(config),
            chat: Arc::new(chat),
            started_at: Instant::now(),
        }
    }

    /// Current readiness snapshot
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            vector_store: true,
            llm: self.chat.invoker().pool_size() > 0,
            realtime: self.chat.search_enabled(),
            chat: true,
            credentials: self.chat.invoker().pool_size(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    /// Persist every resident session before exit
    pub async fn shutdown(&self) -> usize {
        tracing::info!("Shutting down {}...", self.config.assistant.name);
        let saved = self.chat.save_all().await;
        tracing::info!("{} sessions saved. Goodbye!", saved);
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JarvisError;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_startup_without_credentials_fails() {
        let dir = TempDir::new().unwrap();
        let err = AppContext::startup(config_in(&dir)).await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<JarvisError>(),
            Some(JarvisError::MissingCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_startup_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.llm.api_keys = vec!["gsk_key".to_string()];
        config.retrieval.k = 0;
        assert!(AppContext::startup(config).await.is_err());
    }

    #[tokio::test]
    async fn test_startup_and_health() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.llm.api_keys = vec!["gsk_one".to_string(), "gsk_two".to_string()];

        let ctx = AppContext::startup(config).await.unwrap();
        let health = ctx.health();

        assert_eq!(health.status, "healthy");
        assert_eq!(health.credentials, 2);
        assert!(health.llm);
        assert!(!health.realtime);
        assert_eq!(ctx.shutdown().await, 0);
    }
}
