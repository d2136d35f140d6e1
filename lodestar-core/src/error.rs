//! Error types for model and tokenizer backends.

use thiserror::Error;

/// Errors produced by generation, embedding, and tokenizer backends.
///
/// Construction-time failures ([`ModelError::Load`]) are fatal and expected
/// to abort session startup. Everything else is a per-call failure that the
/// pipeline contains and degrades.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend could not be constructed or its weights could not be loaded.
    #[error("model load error: {0}")]
    Load(String),

    /// A model invocation failed for a reason other than memory pressure.
    #[error("inference error: {0}")]
    Inference(String),

    /// The backend ran out of memory while generating.
    ///
    /// Kept distinct from [`ModelError::Inference`] so callers can suggest a
    /// specific remediation (shorter query) instead of a generic message.
    #[error("resource exhausted during generation: {0}")]
    ResourceExhausted(String),

    /// Tokenization or detokenization failed.
    #[error("tokenizer error: {0}")]
    Tokenize(String),

    /// The backend does not implement the requested capability.
    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),
}

/// A convenience result type for backend operations.
pub type Result<T> = std::result::Result<T, ModelError>;
