//! Context retrieval from a local vector index
//!
//! At startup the corpus (learning notes plus past chats) is chunked,
//! embedded and indexed. Per request, [`ContextRetriever::retrieve`] returns
//! the chunks most similar to the user's message.

pub mod chunker;
pub mod embedding;
pub mod index;
pub mod loader;

pub use chunker::TextSplitter;
pub use embedding::{create_embedder, Embedder, HashingEmbedder, OllamaEmbedder};
pub use index::{Document, InMemoryVectorIndex, VectorIndex, PLACEHOLDER_DOCUMENT};

use crate::config::{RetrievalConfig, StorageConfig};
use crate::error::Result;
use std::sync::Arc;

/// Split documents into chunk-sized documents, keeping their source label
pub fn chunk_documents(documents: &[Document], splitter: &TextSplitter) -> Vec<Document> {
    documents
        .iter()
        .flat_map(|doc| {
            splitter
                .split(&doc.content)
                .into_iter()
                .map(move |chunk| Document::new(chunk, doc.source.clone()))
        })
        .collect()
}

/// Turns a query into an ordered list of relevant text chunks
#[derive(Clone)]
pub struct ContextRetriever {
    index: Arc<dyn VectorIndex>,
}

impl ContextRetriever {
    /// Wrap an already built index
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }

    /// Load, chunk, embed and index the on-disk corpus
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder cannot be created or fails while
    /// indexing
    pub async fn from_corpus(retrieval: &RetrievalConfig, storage: &StorageConfig) -> Result<Self> {
        let documents = loader::load_corpus(&storage.learning_data_dir(), &storage.chats_data_dir());
        let splitter = TextSplitter::new(retrieval.chunk_size, retrieval.chunk_overlap);
        let chunks = chunk_documents(&documents, &splitter);
        tracing::info!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        let embedder = create_embedder(&retrieval.embedding)?;
        let index = InMemoryVectorIndex::build(chunks, embedder).await?;
        Ok(Self::new(Arc::new(index)))
    }

    /// Number of indexed chunks
    pub fn indexed_chunks(&self) -> usize {
        self.index.len()
    }

    /// Up to `k` chunk texts, most relevant first
    ///
    /// Failures from the index are returned as-is; callers decide whether to
    /// degrade to empty context.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let documents = self.index.query(query, k).await?;
        tracing::debug!("Retrieved {} context chunks", documents.len());
        Ok(documents.into_iter().map(|d| d.content).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;
    use tempfile::TempDir;

    #[test]
    fn test_chunk_documents_keeps_sources() {
        let docs = vec![
            Document::new("alpha beta gamma delta", "a.txt"),
            Document::new("short", "b.txt"),
        ];
        let chunks = chunk_documents(&docs, &TextSplitter::new(12, 0));
        assert_eq!(
            chunks,
            vec![
                Document::new("alpha beta", "a.txt"),
                Document::new("gamma delta", "a.txt"),
                Document::new("short", "b.txt"),
            ]
        );
    }

    #[tokio::test]
    async fn test_from_corpus_indexes_learning_data() {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            data_dir: dir.path().to_path_buf(),
        };
        std::fs::create_dir_all(storage.learning_data_dir()).unwrap();
        std::fs::write(
            storage.learning_data_dir().join("me.txt"),
            "My favourite colour is teal.",
        )
        .unwrap();

        let retrieval = RetrievalConfig {
            embedding: EmbeddingConfig::default(),
            ..Default::default()
        };
        let retriever = ContextRetriever::from_corpus(&retrieval, &storage).await.unwrap();

        assert_eq!(retriever.indexed_chunks(), 1);
        let chunks = retriever.retrieve("favourite colour", 10).await.unwrap();
        assert_eq!(chunks, vec!["My favourite colour is teal."]);
    }

    #[tokio::test]
    async fn test_from_empty_corpus_returns_placeholder() {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            data_dir: dir.path().to_path_buf(),
        };
        let retriever = ContextRetriever::from_corpus(&RetrievalConfig::default(), &storage)
            .await
            .unwrap();
        assert_eq!(
            retriever.retrieve("hello", 10).await.unwrap(),
            vec![PLACEHOLDER_DOCUMENT]
        );
    }
}
