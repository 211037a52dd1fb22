use async_trait::async_trait;
use jarvis::config::{Config, RetrievalConfig, StorageConfig};
use jarvis::credentials::{Credential, CredentialPool};
use jarvis::error::{JarvisError, Result};
use jarvis::invoker::LlmInvoker;
use jarvis::providers::{ChatProvider, Prompt};
use jarvis::retrieval::ContextRetriever;
use jarvis::retry::RetryPolicy;
use jarvis::search::{SearchAugmenter, SearchHit, SearchProvider};
use jarvis::session::SessionStore;
use jarvis::{AppContext, ChatService, ChatSettings};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const PERSONA: &str = "You are Jarvis, a test assistant.";

/// How a scripted credential misbehaves
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    RateLimited,
    Unavailable,
}

/// Provider that echoes the question and records every call
#[derive(Default)]
pub struct ScriptedProvider {
    failures: HashMap<String, Failure>,
    calls: Mutex<Vec<(String, Prompt)>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn replying() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(keys: &[(&str, Failure)]) -> Arc<Self> {
        Arc::new(Self {
            failures: keys
                .iter()
                .map(|(key, failure)| (key.to_string(), *failure))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    pub fn keys_used(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn last_system(&self) -> String {
        self.prompts()
            .last()
            .map(|prompt| prompt.system.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, credential: &Credential, prompt: &Prompt) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((credential.expose().to_string(), prompt.clone()));
        match self.failures.get(credential.expose()) {
            Some(Failure::RateLimited) => {
                Err(JarvisError::RateLimited("rate_limit_exceeded".to_string()).into())
            }
            Some(Failure::Unavailable) => {
                Err(JarvisError::Provider("503 Service Unavailable".to_string()).into())
            }
            None => Ok(format!("Reply to: {}", prompt.question)),
        }
    }
}

/// Search provider returning a fixed list of hits
#[allow(dead_code)]
pub struct FixedSearch {
    pub hits: Vec<SearchHit>,
}

#[async_trait]
impl SearchProvider for FixedSearch {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn search(
        &self,
        _credential: &Credential,
        _query: &str,
        _max_results: usize,
    ) -> Result<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}

#[allow(dead_code)]
pub fn hit(title: &str, content: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        content: content.to_string(),
        url: format!("https://example.com/{}", title.to_lowercase()),
    }
}

#[allow(dead_code)]
pub fn search_with(hits: Vec<SearchHit>) -> SearchAugmenter {
    let provider: Arc<dyn SearchProvider> = Arc::new(FixedSearch { hits });
    SearchAugmenter::new(
        Some(provider),
        Some(Credential::new("tvly-test")),
        RetryPolicy::no_retry(),
    )
}

#[allow(dead_code)]
/// Config rooted at `data_dir` with no network and no retries
pub fn test_config(data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = data_dir.to_path_buf();
    config.retry.max_attempts = 1;
    config.retry.initial_delay_secs = 0.0;
    config
}

#[allow(dead_code)]
/// Assemble a chat service over `data_dir` without touching the network
pub async fn build_service(
    data_dir: &Path,
    provider: Arc<ScriptedProvider>,
    keys: &[&str],
    search: SearchAugmenter,
) -> ChatService {
    let storage = StorageConfig {
        data_dir: data_dir.to_path_buf(),
    };
    let retriever = ContextRetriever::from_corpus(&RetrievalConfig::default(), &storage)
        .await
        .expect("index should build");
    let pool = CredentialPool::new("test", keys.iter().copied()).expect("non-empty key pool");
    let invoker = Arc::new(LlmInvoker::new(provider, pool, RetryPolicy::no_retry()));
    ChatService::new(
        Arc::new(SessionStore::new(storage.chats_data_dir())),
        retriever,
        search,
        invoker,
        PERSONA.to_string(),
        ChatSettings::default(),
    )
}

#[allow(dead_code)]
pub async fn build_context(
    data_dir: &Path,
    provider: Arc<ScriptedProvider>,
    keys: &[&str],
) -> AppContext {
    let service = build_service(data_dir, provider, keys, SearchAugmenter::disabled()).await;
    AppContext::from_service(test_config(data_dir), service)
}

#[allow(dead_code)]
pub fn write_learning_file(data_dir: &Path, name: &str, contents: &str) -> PathBuf {
    let dir = data_dir.join("learning_data");
    fs::create_dir_all(&dir).expect("failed to create learning_data");
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write learning file");
    path
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
