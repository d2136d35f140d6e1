//! Error types for the evaluation harness.
//!
//! Per-metric failures are not errors; they degrade to sentinel values
//! inside the [`Evaluator`](crate::Evaluator). Only problems with the
//! evaluation run itself (unreadable test set, unwritable report) surface
//! here.

use thiserror::Error;

/// Errors that abort an evaluation run before or after the metric loop.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The test-query file could not be read.
    #[error("cannot read test set {path}: {source}")]
    TestSet {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The report artifact could not be written.
    #[error("cannot write report {path}: {source}")]
    Report {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The report could not be serialized.
    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A convenience result type for evaluation-run operations.
pub type Result<T> = std::result::Result<T, EvalError>;
