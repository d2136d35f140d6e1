//! Generation controller: the pipeline orchestrator.

use std::sync::Arc;

use tracing::{error, info, warn};

use lodestar_core::{
    GenerationModel, GenerationParams, ModelError, Result as ModelResult, Tokenizer,
};

use crate::budget::ContextBudgeter;
use crate::config::RagConfig;
use crate::document::RetrievedDocument;
use crate::error::{RagError, Result};
use crate::postprocess;
use crate::prompt::PromptBuilder;
use crate::refine::QueryRefiner;
use crate::retriever::Retriever;
use crate::safety::SafetyFilter;

/// Fixed response for queries the safety filter rejects.
pub const REFUSAL_MESSAGE: &str =
    "I apologize, but I cannot assist with that topic due to ethical constraints.";

const OOM_MESSAGE: &str =
    "The model ran out of memory while generating a response. Please try a shorter query.";

/// Outcome of a single query through the pipeline.
///
/// The structured `(text, sources)` pair is always populated; inline
/// citation text is rendered separately by
/// [`RagModel::render_citations`] when a caller wants it embedded.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// Cleaned, display-ready response text.
    pub text: String,
    /// Documents actually placed in context, retrieval-rank order.
    pub sources: Vec<RetrievedDocument>,
    /// The rewritten query, when the refiner changed it. The rewrite is
    /// what the rest of the pipeline ran with; surfacing it is up to the
    /// caller.
    pub refined_query: Option<String>,
}

/// Orchestrates safety filter → query refiner → retriever → context
/// budgeter → prompt assembly → model call → post-processing.
///
/// Everything it holds is loaded once and shared read-only; calls are
/// serialized by the caller and run to completion. Construct one via
/// [`RagModel::builder()`].
pub struct RagModel {
    config: RagConfig,
    model: Arc<dyn GenerationModel>,
    tokenizer: Arc<dyn Tokenizer>,
    retriever: Arc<Retriever>,
    safety: SafetyFilter,
    refiner: QueryRefiner,
    budgeter: ContextBudgeter,
    prompts: PromptBuilder,
}

impl RagModel {
    /// Create a new [`RagModelBuilder`].
    pub fn builder() -> RagModelBuilder {
        RagModelBuilder::default()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    /// Answer `query` with retrieved context.
    ///
    /// Never fails: a rejected query yields the fixed refusal, a per-query
    /// retrieval failure degrades to an answer without context, and a
    /// tokenizer or model failure degrades to a textual error message with
    /// empty sources. Out-of-memory failures get their own message so the
    /// user knows a shorter query may work.
    pub async fn generate_response(&self, query: &str) -> RagResponse {
        if !self.safety.is_allowed(query) {
            info!("query rejected by safety filter");
            return RagResponse {
                text: REFUSAL_MESSAGE.to_string(),
                sources: Vec::new(),
                refined_query: None,
            };
        }

        let refined = self.refiner.refine(query);
        let refined_query = (refined != query).then(|| refined.clone());
        if refined_query.is_some() {
            info!("query rewritten by refiner");
        }

        let retrieved = self.retriever.retrieve(&refined, self.config.top_k).await;

        match self.compose_and_generate(&refined, &retrieved).await {
            Ok((text, sources)) => RagResponse { text, sources, refined_query },
            Err(ModelError::ResourceExhausted(cause)) => {
                error!(%cause, "generation exhausted resources");
                RagResponse {
                    text: OOM_MESSAGE.to_string(),
                    sources: Vec::new(),
                    refined_query,
                }
            }
            Err(cause) => {
                warn!(%cause, "generation failed");
                RagResponse {
                    text: format!("An error occurred while generating the response: {cause}"),
                    sources: Vec::new(),
                    refined_query,
                }
            }
        }
    }

    async fn compose_and_generate(
        &self,
        query: &str,
        retrieved: &[RetrievedDocument],
    ) -> ModelResult<(String, Vec<RetrievedDocument>)> {
        let used = self.tokenizer.token_count(self.prompts.system_prompt())?
            + self.tokenizer.token_count(query)?;
        let excerpts = self.budgeter.excerpts(self.tokenizer.as_ref(), used, retrieved)?;
        let sources: Vec<RetrievedDocument> =
            retrieved.iter().take(excerpts.len()).cloned().collect();

        let prompt = self.prompts.build(&excerpts, query);
        // The budgeter already guarantees fit; this is the final safety net.
        let prompt = self.tokenizer.truncate(&prompt, self.config.max_input_tokens)?;

        let params = GenerationParams {
            max_new_tokens: self.config.max_new_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            repeat_penalty: self.config.repeat_penalty,
            sample: true,
            // Padding with the end token keeps padding from ever reading as
            // an early stop.
            pad_token_id: self.tokenizer.eos_token_id(),
        };

        let raw = self.model.generate(&prompt, &params).await?;
        let text = postprocess::clean_response(&raw, &prompt, self.config.wrap_width);
        Ok((text, sources))
    }

    /// Render a numbered citation list for `sources` at the configured
    /// excerpt length. Presentation-layer concern; see
    /// [`postprocess::render_citations`].
    pub fn render_citations(&self, sources: &[RetrievedDocument]) -> String {
        postprocess::render_citations(sources, self.config.citation_chars)
    }
}

/// Builder for constructing a [`RagModel`].
///
/// `config`, `model`, `tokenizer`, and `retriever` are required; the
/// safety filter and refiner default to their standard rule sets.
#[derive(Default)]
pub struct RagModelBuilder {
    config: Option<RagConfig>,
    model: Option<Arc<dyn GenerationModel>>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    retriever: Option<Arc<Retriever>>,
    safety: Option<SafetyFilter>,
    refiner: Option<QueryRefiner>,
}

impl RagModelBuilder {
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn model(mut self, model: Arc<dyn GenerationModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn retriever(mut self, retriever: Arc<Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn safety(mut self, safety: SafetyFilter) -> Self {
        self.safety = Some(safety);
        self
    }

    pub fn refiner(mut self, refiner: QueryRefiner) -> Self {
        self.refiner = Some(refiner);
        self
    }

    /// Build the [`RagModel`], validating that all required parts are set.
    ///
    /// # Errors
    ///
    /// [`RagError::Config`] if a required field is missing.
    pub fn build(self) -> Result<RagModel> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let model = self.model.ok_or_else(|| RagError::Config("model is required".to_string()))?;
        let tokenizer =
            self.tokenizer.ok_or_else(|| RagError::Config("tokenizer is required".to_string()))?;
        let retriever =
            self.retriever.ok_or_else(|| RagError::Config("retriever is required".to_string()))?;

        let budgeter = ContextBudgeter::new(
            config.max_input_tokens,
            config.overhead_tokens,
            config.max_context_documents,
        );
        let prompts = PromptBuilder::new(config.system_prompt.clone());

        Ok(RagModel {
            config,
            model,
            tokenizer,
            retriever,
            safety: self.safety.unwrap_or_default(),
            refiner: self.refiner.unwrap_or_default(),
            budgeter,
            prompts,
        })
    }
}
