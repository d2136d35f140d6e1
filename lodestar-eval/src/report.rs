//! The evaluation report artifact.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Mean and standard deviation of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub mean: f64,
    pub std: f64,
}

/// Model size as reported by the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub model_size_mb: f64,
    pub model_size_gb: f64,
}

/// Metrics for a single test query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    /// Windowed perplexity; the sentinel `inf` marks a failed computation.
    pub perplexity: f64,
    /// Mean wall-clock generation latency over the configured runs.
    pub mean_latency_secs: f64,
}

/// Aggregated metrics over a batch of test queries.
///
/// Written once per evaluation run as a JSON artifact. Non-finite sentinel
/// values serialize as `null`, which readers treat as "metric failed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub queries: Vec<QueryRecord>,
    pub perplexity: Aggregate,
    pub latency: Aggregate,
    pub memory: MemoryStats,
    /// Retrieval latency; absent when the evaluator has no retriever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval: Option<Aggregate>,
}

impl EvaluationReport {
    /// Persist the report as pretty-printed JSON, creating parent
    /// directories as needed (idempotently).
    ///
    /// # Errors
    ///
    /// [`EvalError::Report`] on I/O failure, [`EvalError::Serialize`] if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| EvalError::Report {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).map_err(|source| EvalError::Report {
            path: path.display().to_string(),
            source,
        })
    }
}
