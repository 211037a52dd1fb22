//! Text embedding backends
//!
//! - [`HashingEmbedder`] maps words into a fixed-size vector with feature
//!   hashing. Deterministic, local, no model download.
//! - [`OllamaEmbedder`] calls an Ollama server's `/api/embed` endpoint.

use crate::config::EmbeddingConfig;
use crate::error::{JarvisError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

/// Converts text into fixed-dimensional vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Embed a batch of texts, one vector per input in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Feature-hashing embedder
///
/// Every lowercase alphanumeric word is hashed into one of `dimensions`
/// buckets with a hash-derived sign, and the result is L2-normalized.
/// Texts sharing vocabulary land close together under cosine similarity.
///
/// # Examples
///
/// ```
/// use jarvis::retrieval::HashingEmbedder;
///
/// let embedder = HashingEmbedder::new(64);
/// let v = embedder.embed_one("Rust ownership rules");
/// assert_eq!(v.len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create a hashing embedder producing `dimensions`-sized vectors
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Vector size
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a single text
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let bucket = (h % self.dimensions as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Ollama embedding client
pub struct OllamaEmbedder {
    client: Client,
    host: String,
    model: String,
}

/// Request body for `/api/embed`
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response body from `/api/embed`
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Create a client for the configured Ollama host and model
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(host: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("jarvis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JarvisError::Retrieval(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Ollama embedder: host={}, model={}", host, model);

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.host);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama embed request failed: {}", e);
                JarvisError::Retrieval(format!("Ollama embed request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(JarvisError::Retrieval(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            JarvisError::Retrieval(format!("Failed to parse Ollama embed response: {}", e))
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(JarvisError::Retrieval(format!(
                "Ollama returned {} embeddings for {} inputs",
                body.embeddings.len(),
                texts.len()
            ))
            .into());
        }
        Ok(body.embeddings)
    }
}

/// Create the embedder described by the configuration
///
/// # Errors
///
/// Returns `JarvisError::Config` for an unknown backend name
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.to_lowercase().as_str() {
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimensions))),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            &config.ollama_host,
            &config.ollama_model,
        )?)),
        other => Err(JarvisError::Config(format!("Unknown embedding provider: {}", other)).into()),
    }
}
