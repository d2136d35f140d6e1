//! Persisted exact-search vector index and its row-aligned corpus store.
//!
//! The two artifacts are separate JSON files: the index holds the
//! embedding vectors plus provenance (dimensionality and the embedding
//! model that produced them), the corpus store holds the document texts.
//! Row *i* of the index corresponds to document *i* of the corpus; the
//! loader rejects any pair that violates this.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use lodestar_core::EmbeddingModel;

use crate::error::{RagError, Result};

#[derive(Serialize, Deserialize)]
struct IndexArtifact {
    dimensions: usize,
    embedding_model: String,
    vectors: Vec<Vec<f32>>,
}

#[derive(Serialize, Deserialize)]
struct CorpusArtifact {
    documents: Vec<String>,
}

/// An in-memory exact-search index over persisted embeddings, paired with
/// its corpus store.
///
/// Search is a brute-force squared-Euclidean scan: no approximation, no
/// re-ranking. Results come back ascending by distance, with ties broken
/// by corpus insertion order (the sort is stable).
#[derive(Debug)]
pub struct EmbeddingIndex {
    dimensions: usize,
    embedding_model: String,
    vectors: Vec<Vec<f32>>,
    documents: Vec<String>,
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl EmbeddingIndex {
    /// Load and validate the index and corpus artifacts.
    ///
    /// # Errors
    ///
    /// [`RagError::IndexUnavailable`] if either file is missing or
    /// malformed, if the row counts disagree, or if any vector does not
    /// match the recorded dimensionality. All of this is checked here so a
    /// broken pair can never serve queries.
    pub fn load(index_path: impl AsRef<Path>, corpus_path: impl AsRef<Path>) -> Result<Self> {
        let index_path = index_path.as_ref();
        let corpus_path = corpus_path.as_ref();

        let raw = fs::read_to_string(index_path).map_err(|e| {
            RagError::IndexUnavailable(format!("cannot read {}: {e}", index_path.display()))
        })?;
        let index: IndexArtifact = serde_json::from_str(&raw).map_err(|e| {
            RagError::IndexUnavailable(format!("cannot parse {}: {e}", index_path.display()))
        })?;

        let raw = fs::read_to_string(corpus_path).map_err(|e| {
            RagError::IndexUnavailable(format!("cannot read {}: {e}", corpus_path.display()))
        })?;
        let corpus: CorpusArtifact = serde_json::from_str(&raw).map_err(|e| {
            RagError::IndexUnavailable(format!("cannot parse {}: {e}", corpus_path.display()))
        })?;

        Self::from_parts(index, corpus)
    }

    fn from_parts(index: IndexArtifact, corpus: CorpusArtifact) -> Result<Self> {
        if index.vectors.len() != corpus.documents.len() {
            return Err(RagError::IndexUnavailable(format!(
                "index has {} rows but corpus has {} documents",
                index.vectors.len(),
                corpus.documents.len()
            )));
        }
        if let Some(row) =
            index.vectors.iter().position(|v| v.len() != index.dimensions)
        {
            return Err(RagError::IndexUnavailable(format!(
                "vector at row {row} has dimension {} (index declares {})",
                index.vectors[row].len(),
                index.dimensions
            )));
        }

        info!(
            documents = corpus.documents.len(),
            dimensions = index.dimensions,
            embedding_model = %index.embedding_model,
            "index loaded"
        );

        Ok(Self {
            dimensions: index.dimensions,
            embedding_model: index.embedding_model,
            vectors: index.vectors,
            documents: corpus.documents,
        })
    }

    /// Embed `documents` and assemble a fresh index.
    ///
    /// This is the offline build step; the resulting artifacts are written
    /// with [`save`](EmbeddingIndex::save) and reloaded read-only at
    /// service start. `model_name` is recorded as provenance so a later
    /// load can be checked against the embedding model in use.
    ///
    /// # Errors
    ///
    /// [`RagError::IndexBuild`] if embedding fails.
    pub async fn build(
        documents: Vec<String>,
        embedder: &dyn EmbeddingModel,
        model_name: &str,
    ) -> Result<Self> {
        let texts: Vec<&str> = documents.iter().map(String::as_str).collect();
        let vectors = embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| RagError::IndexBuild(format!("embedding failed: {e}")))?;

        info!(documents = documents.len(), "index built");

        Self::from_parts(
            IndexArtifact {
                dimensions: embedder.dimensions(),
                embedding_model: model_name.to_string(),
                vectors,
            },
            CorpusArtifact { documents },
        )
    }

    /// Persist the index and corpus artifacts, creating parent directories
    /// as needed.
    ///
    /// # Errors
    ///
    /// [`RagError::IndexBuild`] on serialization or I/O failure.
    pub fn save(&self, index_path: impl AsRef<Path>, corpus_path: impl AsRef<Path>) -> Result<()> {
        let index = IndexArtifact {
            dimensions: self.dimensions,
            embedding_model: self.embedding_model.clone(),
            vectors: self.vectors.clone(),
        };
        write_artifact(index_path.as_ref(), &index)?;

        let corpus = CorpusArtifact { documents: self.documents.clone() };
        write_artifact(corpus_path.as_ref(), &corpus)?;
        Ok(())
    }

    /// The `top_k` nearest rows to `query`, as `(row, squared distance)`
    /// pairs ascending by distance.
    ///
    /// Returns fewer than `top_k` pairs when the corpus is smaller, and
    /// nothing for an empty corpus.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<(usize, f32)> {
        debug_assert_eq!(query.len(), self.dimensions);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, vector)| (row, squared_l2(query, vector)))
            .collect();
        // Stable sort: equal distances keep corpus insertion order.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        scored
    }

    /// Document text at `row`, if the row exists.
    pub fn document(&self, row: usize) -> Option<&str> {
        self.documents.get(row).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Name of the embedding model the vectors were built with.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

fn write_artifact<T: Serialize>(path: &Path, artifact: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RagError::IndexBuild(format!("cannot create {}: {e}", parent.display())))?;
    }
    let data = serde_json::to_string_pretty(artifact)
        .map_err(|e| RagError::IndexBuild(format!("cannot serialize {}: {e}", path.display())))?;
    fs::write(path, data)
        .map_err(|e| RagError::IndexBuild(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}
