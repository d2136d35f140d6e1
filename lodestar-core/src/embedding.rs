//! Embedding model boundary.

use async_trait::async_trait;

use crate::error::Result;

/// A backend that turns text into fixed-dimension vectors.
///
/// The same model (and therefore the same dimensionality) must be used when
/// an index is built and when it is queried; the index loader enforces this
/// by comparing [`dimensions`](EmbeddingModel::dimensions) against the
/// persisted artifact.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts.
    ///
    /// The default embeds sequentially; backends with native batching
    /// should override this.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Dimensionality of the vectors this backend produces.
    fn dimensions(&self) -> usize;
}
