//! In-memory vector index with brute-force cosine similarity search
//!
//! The index is built once at startup and is read-only afterwards, so it is
//! shared through an `Arc` without a lock. Search is O(n) in the number of
//! chunks, which is fine for a single operator's notes and chat logs.

use crate::error::{JarvisError, Result};
use crate::retrieval::embedding::Embedder;

use async_trait::async_trait;
use std::sync::Arc;

/// Text stored in the index for an empty corpus
pub const PLACEHOLDER_DOCUMENT: &str = "No data available yet.";

const EMBED_BATCH_SIZE: usize = 64;

/// A unit of indexed text and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Text content
    pub content: String,
    /// Origin label: a file name or `chat_<session_id>`
    pub source: String,
}

impl Document {
    /// Creates a new document
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// Similarity lookup over indexed documents
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Up to `k` documents, most similar to `text` first
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Document>>;

    /// Number of indexed documents
    fn len(&self) -> usize;

    /// Whether the index holds no documents
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Entry {
    document: Document,
    embedding: Vec<f32>,
}

/// Brute-force cosine similarity index
pub struct InMemoryVectorIndex {
    embedder: Arc<dyn Embedder>,
    entries: Vec<Entry>,
}

impl InMemoryVectorIndex {
    /// Embed `documents` and build the index
    ///
    /// An empty document set is replaced by a single placeholder document so
    /// that every query has something to return.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder fails or returns the wrong number of
    /// vectors
    pub async fn build(documents: Vec<Document>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let documents = if documents.is_empty() {
            tracing::info!("No documents to index; using placeholder");
            vec![Document::new(PLACEHOLDER_DOCUMENT, "placeholder")]
        } else {
            documents
        };

        let mut entries = Vec::with_capacity(documents.len());
        for batch in documents.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let vectors = embedder.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(JarvisError::Retrieval(format!(
                    "Embedder {} returned {} vectors for {} texts",
                    embedder.name(),
                    vectors.len(),
                    batch.len()
                ))
                .into());
            }
            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(document, embedding)| Entry {
                        document,
                        embedding,
                    }),
            );
        }

        tracing::info!(
            "Built vector index: {} chunks, embedder={}",
            entries.len(),
            embedder.name()
        );
        Ok(Self { embedder, entries })
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Document>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self
            .embedder
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| JarvisError::Retrieval("Embedder returned no vector".to_string()))?;

        let mut scored: Vec<(f64, &Entry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query, &entry.embedding), entry))
            .collect();

        // Stable sort keeps ingestion order among equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(_, entry)| entry.document.clone())
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if the lengths differ or either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
