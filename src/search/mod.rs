//! Web search augmentation for the realtime chat path
//!
//! [`SearchAugmenter::augment`] turns a question into a block of formatted
//! search results for the system message. It never fails: a missing
//! credential, a provider error or an empty result set all produce an
//! empty string, and the request carries on without live data.

pub mod tavily;

pub use tavily::TavilyClient;

use crate::config::SearchConfig;
use crate::credentials::Credential;
use crate::error::Result;
use crate::retry::{with_retry, RetryPolicy};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One web search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title
    #[serde(default = "default_title")]
    pub title: String,
    /// Short description or extracted snippet
    #[serde(default = "default_content")]
    pub content: String,
    /// Page URL, possibly empty
    #[serde(default)]
    pub url: String,
}

fn default_title() -> String {
    "No title".to_string()
}

fn default_content() -> String {
    "No description".to_string()
}

/// A remote web search service
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Search for `query`, returning at most `max_results` hits
    async fn search(
        &self,
        credential: &Credential,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>>;
}

/// Format hits as the prompt block used in the system message
///
/// Returns an empty string when there are no hits.
///
/// # Examples
///
/// ```
/// use jarvis::search::{format_results, SearchHit};
///
/// let hits = vec![SearchHit {
///     title: "Rust 2.0".to_string(),
///     content: "Not real".to_string(),
///     url: String::new(),
/// }];
/// let block = format_results("rust news", &hits);
/// assert!(block.starts_with("Search results for 'rust news':\n[start]\n"));
/// assert!(block.ends_with("[end]"));
/// ```
pub fn format_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return String::new();
    }

    let mut block = format!("Search results for '{}':\n[start]\n", query);
    for hit in hits {
        block.push_str(&format!("Title: {}\n", hit.title));
        block.push_str(&format!("Description: {}\n", hit.content));
        if !hit.url.is_empty() {
            block.push_str(&format!("URL: {}\n", hit.url));
        }
        block.push('\n');
    }
    block.push_str("[end]");
    block
}

/// Best-effort search step of the realtime path
pub struct SearchAugmenter {
    provider: Option<Arc<dyn SearchProvider>>,
    credential: Option<Credential>,
    retry: RetryPolicy,
}

impl SearchAugmenter {
    /// Create an augmenter; without a provider or credential it is disabled
    pub fn new(
        provider: Option<Arc<dyn SearchProvider>>,
        credential: Option<Credential>,
        retry: RetryPolicy,
    ) -> Self {
        if provider.is_none() || credential.is_none() {
            tracing::warn!("Search credential not set. Realtime search will be unavailable.");
        }
        Self {
            provider,
            credential,
            retry,
        }
    }

    /// An augmenter that always returns no results
    pub fn disabled() -> Self {
        Self {
            provider: None,
            credential: None,
            retry: RetryPolicy::no_retry(),
        }
    }

    /// Build the Tavily-backed augmenter from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created
    pub fn from_config(config: &SearchConfig, retry: RetryPolicy) -> Result<Self> {
        match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                let provider: Arc<dyn SearchProvider> = Arc::new(TavilyClient::new(config)?);
                Ok(Self::new(Some(provider), Some(Credential::new(key)), retry))
            }
            _ => Ok(Self::new(None, None, retry)),
        }
    }

    /// Whether searches will actually be attempted
    pub fn is_enabled(&self) -> bool {
        self.provider.is_some() && self.credential.is_some()
    }

    /// Search for `question` and format the results, or return `""`
    pub async fn augment(&self, question: &str, max_results: usize) -> String {
        let (provider, credential) = match (&self.provider, &self.credential) {
            (Some(provider), Some(credential)) => (provider, credential),
            _ => {
                tracing::warn!("Search skipped: no search credential configured");
                return String::new();
            }
        };

        tracing::info!("Searching {} for: {}", provider.name(), question);
        let result = with_retry(&self.retry, provider.name(), || {
            provider.search(credential, question, max_results)
        })
        .await;

        match result {
            Ok(hits) if hits.is_empty() => {
                tracing::warn!("No search results found for query: {}", question);
                String::new()
            }
            Ok(mut hits) => {
                hits.truncate(max_results);
                tracing::info!(
                    "Search completed for query: {} ({} results)",
                    question,
                    hits.len()
                );
                format_results(question, &hits)
            }
            Err(e) => {
                tracing::error!("Error performing {} search: {}", provider.name(), e);
                String::new()
            }
        }
    }
}
