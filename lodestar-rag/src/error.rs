//! Error types for the `lodestar-rag` crate.
//!
//! Only construction-time conditions appear here. Per-query retrieval and
//! generation failures are contained by [`Retriever::retrieve`] and
//! [`RagModel::generate_response`] and converted into degraded results, so
//! they have no error variants.
//!
//! [`Retriever::retrieve`]: crate::Retriever::retrieve
//! [`RagModel::generate_response`]: crate::RagModel::generate_response

use thiserror::Error;

/// Errors that abort pipeline construction.
#[derive(Debug, Error)]
pub enum RagError {
    /// The vector index or corpus store is missing, corrupt, or incoherent
    /// (row-count or dimension mismatch). Detected at load time, never
    /// deferred to the first query.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    /// Building or persisting the index artifacts failed.
    #[error("index build failed: {0}")]
    IndexBuild(String),

    /// A configuration or builder validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A convenience result type for construction-time operations.
pub type Result<T> = std::result::Result<T, RagError>;
