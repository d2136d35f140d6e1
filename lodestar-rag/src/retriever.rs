//! Query-time retrieval: embed, search, map rows to documents.

use std::sync::Arc;

use tracing::{debug, warn};

use lodestar_core::EmbeddingModel;

use crate::document::RetrievedDocument;
use crate::error::{RagError, Result};
use crate::index::EmbeddingIndex;

/// Turns a raw text query into ranked corpus documents.
///
/// Owns the embedding backend and the loaded [`EmbeddingIndex`]. The
/// dimensionality of the two is checked once at construction; after that
/// the retriever is read-only and shared freely.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingModel>,
    index: EmbeddingIndex,
}

impl Retriever {
    /// Pair an embedding backend with a loaded index.
    ///
    /// # Errors
    ///
    /// [`RagError::IndexUnavailable`] if the backend's dimensionality does
    /// not match the index artifact: querying across that mismatch would
    /// be silently incoherent, so it is refused up front.
    pub fn new(embedder: Arc<dyn EmbeddingModel>, index: EmbeddingIndex) -> Result<Self> {
        if !index.is_empty() && embedder.dimensions() != index.dimensions() {
            return Err(RagError::IndexUnavailable(format!(
                "embedding model produces {}-dimensional vectors but the index was built with {} \
                 (model: {})",
                embedder.dimensions(),
                index.dimensions(),
                index.embedding_model()
            )));
        }
        Ok(Self { embedder, index })
    }

    /// The `top_k` documents nearest to `query`, most similar first.
    ///
    /// Returns at most `top_k` documents and at most the corpus size. A
    /// per-query embedding failure is contained here: it is logged and an
    /// empty result is returned, so generation proceeds with no context
    /// instead of crashing.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Vec<RetrievedDocument> {
        if self.index.is_empty() {
            return Vec::new();
        }

        let embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed; retrieving no context");
                return Vec::new();
            }
        };

        let hits = self.index.search(&embedding, top_k.max(1));
        debug!(results = hits.len(), "retrieval complete");

        hits.into_iter()
            .map(|(row, distance)| RetrievedDocument {
                index: row,
                text: self.index.document(row).unwrap_or_default().to_string(),
                distance,
            })
            .collect()
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }
}
