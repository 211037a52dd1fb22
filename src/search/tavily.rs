//! Tavily search client

use crate::config::SearchConfig;
use crate::credentials::Credential;
use crate::error::{JarvisError, Result};
use crate::search::{SearchHit, SearchProvider};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tavily `/search` client
pub struct TavilyClient {
    client: Client,
    api_base: String,
}

/// Request body for `/search`
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
}

/// Response body from `/search`
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilyClient {
    /// Create a new Tavily client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("jarvis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JarvisError::Search(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Tavily search client initialized: api_base={}", config.api_base);

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(
        &self,
        credential: &Credential,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>> {
        let url = format!("{}/search", self.api_base);
        let request = SearchRequest {
            query,
            search_depth: "basic",
            max_results,
            include_answer: false,
            include_raw_content: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Tavily request failed: {}", e);
                JarvisError::Search(format!("Tavily request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Tavily returned error {}: {}", status, error_text);
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                JarvisError::RateLimited(format!("Tavily returned {}: {}", status, error_text))
            } else {
                JarvisError::Search(format!("Tavily returned error {}: {}", status, error_text))
            }
            .into());
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Tavily response: {}", e);
            JarvisError::Search(format!("Failed to parse Tavily response: {}", e))
        })?;

        Ok(body.results)
    }
}
