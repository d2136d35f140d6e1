//! HuggingFace `tokenizers` wrapper.

use std::path::Path;

use lodestar_core::{ModelError, Result, Tokenizer};

/// A tokenizer loaded from a HuggingFace `tokenizer.json` file.
///
/// This is the id-level tokenizer the context budgeter and the evaluation
/// harness use when the generation model's vocabulary is available on disk.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file.
    ///
    /// # Errors
    ///
    /// [`ModelError::Load`] if the file is missing or malformed; this is a
    /// construction-time failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| ModelError::Load(format!("tokenizer {}: {e}", path.display())))?;
        Ok(Self { inner })
    }
}

impl Tokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| ModelError::Tokenize(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner.decode(ids, true).map_err(|e| ModelError::Tokenize(e.to_string()))
    }

    fn eos_token_id(&self) -> Option<u32> {
        ["</s>", "<|endoftext|>", "<|end_of_text|>", "<eos>"]
            .iter()
            .find_map(|token| self.inner.token_to_id(token))
    }
}
