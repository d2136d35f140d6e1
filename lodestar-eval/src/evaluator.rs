//! Metric computation over the pipeline.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use lodestar_core::{GenerationModel, GenerationParams, Result as ModelResult, Tokenizer};
use lodestar_rag::Retriever;

use crate::error::{EvalError, Result};
use crate::report::{Aggregate, EvaluationReport, MemoryStats, QueryRecord};

/// Perplexity sliding-window length, in tokens.
pub const PERPLEXITY_WINDOW: usize = 512;
/// Perplexity sliding-window stride, in tokens.
pub const PERPLEXITY_STRIDE: usize = 128;

const SPEED_RUNS: usize = 3;
const SPEED_MAX_NEW_TOKENS: usize = 100;
const RETRIEVAL_TOP_K: usize = 5;

/// Drives the model (and optionally the retriever) over test queries and
/// computes quality/performance metrics.
///
/// Every metric contains its own failures: a failed computation reports
/// the worst-case sentinel (`inf`) and the batch continues, so an
/// evaluation run always yields a complete, persistable report.
pub struct Evaluator {
    model: Arc<dyn GenerationModel>,
    tokenizer: Arc<dyn Tokenizer>,
    retriever: Option<Arc<Retriever>>,
}

impl Evaluator {
    pub fn new(model: Arc<dyn GenerationModel>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { model, tokenizer, retriever: None }
    }

    /// Also measure retrieval latency against this retriever.
    pub fn with_retriever(mut self, retriever: Arc<Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Windowed perplexity of `text` under the generation model.
    ///
    /// The text is tokenized once, then scored in windows of
    /// [`PERPLEXITY_WINDOW`] tokens advancing by [`PERPLEXITY_STRIDE`];
    /// each window contributes the mean negative log-likelihood of its
    /// non-overlapping tail only, so long inputs are scored without
    /// truncation bias. The window means are averaged and exponentiated.
    ///
    /// Failures (and empty text) report `inf` instead of erroring.
    pub async fn perplexity(&self, text: &str) -> f64 {
        match self.windowed_perplexity(text).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "perplexity computation failed; reporting worst case");
                f64::INFINITY
            }
        }
    }

    async fn windowed_perplexity(&self, text: &str) -> ModelResult<f64> {
        let ids = self.tokenizer.encode(text)?;
        let seq_len = ids.len();

        let mut nlls = Vec::new();
        let mut prev_end = 0usize;
        let mut begin = 0usize;
        while begin < seq_len {
            let end = (begin + PERPLEXITY_WINDOW).min(seq_len);
            // Score only the tokens this window sees for the first time.
            let target_len = end - prev_end;
            let window = &ids[begin..end];
            let nll = self.model.score(window, window.len() - target_len).await?;
            nlls.push(f64::from(nll));
            prev_end = end;
            if end == seq_len {
                break;
            }
            begin += PERPLEXITY_STRIDE;
        }

        if nlls.is_empty() {
            return Ok(f64::INFINITY);
        }
        Ok((nlls.iter().sum::<f64>() / nlls.len() as f64).exp())
    }

    /// Mean/std wall-clock latency of `runs` bounded generations on `text`.
    ///
    /// Failures report `inf`/`inf` instead of erroring.
    pub async fn speed(&self, text: &str, runs: usize) -> Aggregate {
        let params = GenerationParams {
            max_new_tokens: SPEED_MAX_NEW_TOKENS,
            sample: false,
            ..GenerationParams::default()
        };

        let mut times = Vec::with_capacity(runs.max(1));
        for _ in 0..runs.max(1) {
            let start = Instant::now();
            if let Err(e) = self.model.generate(text, &params).await {
                warn!(error = %e, "speed run failed; reporting worst case");
                return Aggregate { mean: f64::INFINITY, std: f64::INFINITY };
            }
            times.push(start.elapsed().as_secs_f64());
        }
        mean_std(&times)
    }

    /// Model size in MB/GB as reported by the backend; `inf` sentinels
    /// when the backend does not know its footprint.
    pub fn memory_footprint(&self) -> MemoryStats {
        match self.model.memory_footprint() {
            Some(bytes) => MemoryStats {
                model_size_mb: bytes as f64 / (1024.0 * 1024.0),
                model_size_gb: bytes as f64 / (1024.0 * 1024.0 * 1024.0),
            },
            None => {
                warn!("backend does not report a memory footprint; reporting worst case");
                MemoryStats { model_size_mb: f64::INFINITY, model_size_gb: f64::INFINITY }
            }
        }
    }

    /// Mean/std retrieval latency over `queries`, or `None` when the
    /// evaluator has no retriever.
    pub async fn retrieval_latency(&self, queries: &[String]) -> Option<Aggregate> {
        let retriever = self.retriever.as_ref()?;
        let mut times = Vec::with_capacity(queries.len());
        for query in queries {
            let start = Instant::now();
            retriever.retrieve(query, RETRIEVAL_TOP_K).await;
            times.push(start.elapsed().as_secs_f64());
        }
        Some(mean_std(&times))
    }

    /// Evaluate every non-empty line of `test_set_path` and assemble the
    /// report, optionally persisting it to `output_path`.
    ///
    /// Per-query metric failures land in the report as sentinels; only an
    /// unreadable test set or an unwritable report aborts the run.
    pub async fn run_full_evaluation(
        &self,
        test_set_path: impl AsRef<Path>,
        output_path: Option<&Path>,
    ) -> Result<EvaluationReport> {
        let test_set_path = test_set_path.as_ref();
        let raw = fs::read_to_string(test_set_path).map_err(|source| EvalError::TestSet {
            path: test_set_path.display().to_string(),
            source,
        })?;
        let queries: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        info!(queries = queries.len(), "starting evaluation run");

        let mut records = Vec::with_capacity(queries.len());
        for query in &queries {
            let perplexity = self.perplexity(query).await;
            let speed = self.speed(query, SPEED_RUNS).await;
            records.push(QueryRecord {
                query: query.clone(),
                perplexity,
                mean_latency_secs: speed.mean,
            });
        }

        let perplexities: Vec<f64> = records.iter().map(|r| r.perplexity).collect();
        let latencies: Vec<f64> = records.iter().map(|r| r.mean_latency_secs).collect();

        let report = EvaluationReport {
            generated_at: Utc::now(),
            queries: records,
            perplexity: mean_std(&perplexities),
            latency: mean_std(&latencies),
            memory: self.memory_footprint(),
            retrieval: self.retrieval_latency(&queries).await,
        };

        if let Some(path) = output_path {
            report.save(path)?;
            info!(path = %path.display(), "evaluation report written");
        }

        Ok(report)
    }
}

/// Mean and population standard deviation; zeros for an empty series.
fn mean_std(values: &[f64]) -> Aggregate {
    if values.is_empty() {
        return Aggregate { mean: 0.0, std: 0.0 };
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    Aggregate { mean, std: variance.sqrt() }
}
