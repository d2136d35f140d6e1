//! Configuration for the generation pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Always provide accurate, \
     factual information based on the given context. If you're unsure or the context doesn't \
     contain relevant information, say so.";

/// Tunable parameters of the generation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Fixed system instruction prepended to every prompt.
    pub system_prompt: String,
    /// Model input window, in tokens. The assembled prompt never exceeds this.
    pub max_input_tokens: usize,
    /// New-token generation budget.
    pub max_new_tokens: usize,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Repetition penalty.
    pub repeat_penalty: f32,
    /// Documents requested from retrieval per query.
    pub top_k: usize,
    /// Documents actually placed in context (the budget is split across
    /// this many).
    pub max_context_documents: usize,
    /// Token allowance reserved for prompt scaffolding.
    pub overhead_tokens: usize,
    /// Terminal display width for the wrapped response.
    pub wrap_width: usize,
    /// Characters per source excerpt in rendered citations.
    pub citation_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_input_tokens: 2048,
            max_new_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
            repeat_penalty: 1.1,
            top_k: 3,
            max_context_documents: 2,
            overhead_tokens: 100,
            wrap_width: 76,
            citation_chars: 100,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn max_input_tokens(mut self, tokens: usize) -> Self {
        self.config.max_input_tokens = tokens;
        self
    }

    pub fn max_new_tokens(mut self, tokens: usize) -> Self {
        self.config.max_new_tokens = tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.config.top_p = top_p;
        self
    }

    pub fn repeat_penalty(mut self, penalty: f32) -> Self {
        self.config.repeat_penalty = penalty;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    pub fn max_context_documents(mut self, count: usize) -> Self {
        self.config.max_context_documents = count;
        self
    }

    pub fn overhead_tokens(mut self, tokens: usize) -> Self {
        self.config.overhead_tokens = tokens;
        self
    }

    pub fn wrap_width(mut self, width: usize) -> Self {
        self.config.wrap_width = width;
        self
    }

    pub fn citation_chars(mut self, chars: usize) -> Self {
        self.config.citation_chars = chars;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// [`RagError::Config`] if:
    /// - `top_k == 0` or `max_context_documents == 0`
    /// - `overhead_tokens >= max_input_tokens`
    /// - `wrap_width == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_context_documents == 0 {
            return Err(RagError::Config(
                "max_context_documents must be greater than zero".to_string(),
            ));
        }
        if self.config.overhead_tokens >= self.config.max_input_tokens {
            return Err(RagError::Config(format!(
                "overhead_tokens ({}) must be less than max_input_tokens ({})",
                self.config.overhead_tokens, self.config.max_input_tokens
            )));
        }
        if self.config.wrap_width == 0 {
            return Err(RagError::Config("wrap_width must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config, RagConfig::default());
        assert_eq!(config.top_k, 3);
        assert_eq!(config.max_context_documents, 2);
        assert_eq!(config.max_input_tokens, 2048);
        assert_eq!(config.wrap_width, 76);
    }

    #[test]
    fn zero_top_k_is_rejected() {
        assert!(RagConfig::builder().top_k(0).build().is_err());
    }

    #[test]
    fn overhead_must_leave_room_for_context() {
        let result = RagConfig::builder().max_input_tokens(100).overhead_tokens(100).build();
        assert!(result.is_err());
    }
}
