//! Generation model boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Decoding parameters passed to a [`GenerationModel`] on every call.
///
/// The defaults mirror the pipeline's standard decoding setup: bounded new
/// tokens, sampling enabled, moderate temperature and nucleus mass, and a
/// mild repetition penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum number of new tokens to generate.
    pub max_new_tokens: usize,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Repetition penalty applied during decoding.
    pub repeat_penalty: f32,
    /// Whether to sample (`true`) or decode greedily (`false`).
    pub sample: bool,
    /// Padding token id. `None` means the backend pads with its own
    /// end-of-sequence token, so padding never terminates generation early.
    pub pad_token_id: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
            repeat_penalty: 1.1,
            sample: true,
            pad_token_id: None,
        }
    }
}

impl GenerationParams {
    /// Copy of these parameters with a different new-token budget.
    pub fn with_max_new_tokens(mut self, max_new_tokens: usize) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }
}

/// A text-generation backend.
///
/// Implementations wrap a concrete model (an HTTP inference server, an
/// in-process runtime, a test double) behind a single-shot prompt-in,
/// text-out call. The pipeline never assumes anything about the
/// architecture behind this trait, only the parameter contract.
///
/// # Example
///
/// ```rust,ignore
/// use lodestar_core::{GenerationModel, GenerationParams};
///
/// let text = model.generate("Why is the sky blue?", &GenerationParams::default()).await?;
/// ```
#[async_trait]
pub trait GenerationModel: Send + Sync {
    /// A human-readable backend identifier, used in logs.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt` under the given decoding parameters.
    ///
    /// Backends may return the completion alone or the prompt concatenated
    /// with the completion; callers are expected to strip an echoed prompt.
    ///
    /// # Errors
    ///
    /// [`ModelError::ResourceExhausted`] when the backend runs out of memory,
    /// [`ModelError::Inference`] for any other invocation failure.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Mean negative log-likelihood of `token_ids[target_start..]`, with the
    /// full window available as context.
    ///
    /// Used by the evaluation harness for windowed perplexity. Backends that
    /// cannot expose token-level likelihoods (most HTTP inference servers)
    /// keep the default, which reports the capability as unsupported; the
    /// evaluator degrades that into a sentinel metric value.
    async fn score(&self, token_ids: &[u32], target_start: usize) -> Result<f32> {
        let _ = (token_ids, target_start);
        Err(ModelError::Unsupported("token-level scoring"))
    }

    /// Resident size of the loaded model in bytes, if the backend knows it.
    fn memory_footprint(&self) -> Option<u64> {
        None
    }
}
