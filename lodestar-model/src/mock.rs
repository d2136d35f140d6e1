//! Deterministic test doubles for the model boundaries.
//!
//! Used by unit and integration tests across the workspace; kept in the
//! library (not behind `cfg(test)`) so downstream crates can drive the
//! pipeline without a live backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use lodestar_core::{
    EmbeddingModel, GenerationModel, GenerationParams, ModelError, Result, Tokenizer,
};

/// Which error a [`MockModel`] should return from `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Inference,
    ResourceExhausted,
}

/// A canned-response generation model with call counting.
pub struct MockModel {
    response: String,
    nll: f32,
    failure: Option<MockFailure>,
    poison_token: Option<u32>,
    footprint: Option<u64>,
    calls: AtomicUsize,
}

impl MockModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            nll: 1.0,
            failure: None,
            poison_token: None,
            footprint: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every `generate` call fail with the given error kind.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Fixed mean negative log-likelihood returned by `score`.
    pub fn with_nll(mut self, nll: f32) -> Self {
        self.nll = nll;
        self
    }

    /// Make `score` fail for any window containing this token id.
    pub fn with_poison_token(mut self, id: u32) -> Self {
        self.poison_token = Some(id);
        self
    }

    /// Reported model size in bytes.
    pub fn with_memory_footprint(mut self, bytes: u64) -> Self {
        self.footprint = Some(bytes);
        self
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(MockFailure::Inference) => {
                Err(ModelError::Inference("mock inference failure".to_string()))
            }
            Some(MockFailure::ResourceExhausted) => {
                Err(ModelError::ResourceExhausted("mock allocation failure".to_string()))
            }
            None => Ok(self.response.clone()),
        }
    }

    async fn score(&self, token_ids: &[u32], _target_start: usize) -> Result<f32> {
        if let Some(poison) = self.poison_token {
            if token_ids.contains(&poison) {
                return Err(ModelError::Inference("poisoned window".to_string()));
            }
        }
        Ok(self.nll)
    }

    fn memory_footprint(&self) -> Option<u64> {
        self.footprint
    }
}

/// A deterministic embedding model.
///
/// Texts registered with [`with_vector`](MockEmbedder::with_vector) return
/// their programmed vector; everything else gets a stable byte-fold so two
/// runs over the same input always agree.
pub struct MockEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
    fail: bool,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, vectors: HashMap::new(), fail: false }
    }

    /// Program an exact vector for an exact text.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    /// Make every `embed` call fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl EmbeddingModel for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(ModelError::Inference("mock embedding failure".to_string()));
        }
        if let Some(vector) = self.vectors.get(text) {
            return Ok(vector.clone());
        }
        let mut vector = vec![0.0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimensions] += f32::from(byte) / 255.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// One token per character; ids are Unicode scalar values.
///
/// Round-trips losslessly, which makes budget-truncation tests exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        Ok(text.chars().map(u32::from).collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        ids.iter()
            .map(|&id| {
                char::from_u32(id)
                    .ok_or_else(|| ModelError::Tokenize(format!("invalid scalar {id}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_model_counts_calls() {
        let model = MockModel::new("answer");
        assert_eq!(model.calls(), 0);
        let out =
            model.generate("prompt", &GenerationParams::default()).await.unwrap();
        assert_eq!(out, "answer");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn mock_model_failure_kinds_are_distinct() {
        let oom = MockModel::new("x").with_failure(MockFailure::ResourceExhausted);
        let err = oom.generate("p", &GenerationParams::default()).await.unwrap_err();
        assert!(matches!(err, ModelError::ResourceExhausted(_)));

        let plain = MockModel::new("x").with_failure(MockFailure::Inference);
        let err = plain.generate("p", &GenerationParams::default()).await.unwrap_err();
        assert!(matches!(err, ModelError::Inference(_)));
    }

    #[tokio::test]
    async fn mock_embedder_is_deterministic() {
        let embedder = MockEmbedder::new(8);
        let a = embedder.embed("same text").await.unwrap();
        let b = embedder.embed("same text").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }

    #[tokio::test]
    async fn mock_embedder_prefers_programmed_vectors() {
        let embedder = MockEmbedder::new(2).with_vector("q", vec![1.0, 0.0]);
        assert_eq!(embedder.embed("q").await.unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn char_tokenizer_round_trips() {
        let tok = CharTokenizer;
        let ids = tok.encode("héllo").unwrap();
        assert_eq!(ids.len(), 5);
        assert_eq!(tok.decode(&ids).unwrap(), "héllo");
    }

    #[test]
    fn char_tokenizer_truncates_on_token_boundary() {
        let tok = CharTokenizer;
        assert_eq!(tok.truncate("hello world", 5).unwrap(), "hello");
    }
}
