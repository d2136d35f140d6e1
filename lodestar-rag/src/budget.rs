//! Token budgeting for retrieved context.

use tracing::debug;

use lodestar_core::{Result as ModelResult, Tokenizer};

use crate::document::RetrievedDocument;

/// Trims retrieved documents so the assembled prompt fits the model input
/// window.
///
/// A fixed overhead allowance is reserved for prompt scaffolding, and the
/// remaining budget is split evenly across at most `max_documents`
/// documents. Each selected document is truncated independently, so every
/// included document contributes at least its share rather than the first
/// one consuming the whole budget.
#[derive(Debug, Clone)]
pub struct ContextBudgeter {
    max_input_tokens: usize,
    overhead_tokens: usize,
    max_documents: usize,
}

impl ContextBudgeter {
    pub fn new(max_input_tokens: usize, overhead_tokens: usize, max_documents: usize) -> Self {
        Self { max_input_tokens, overhead_tokens, max_documents: max_documents.max(1) }
    }

    /// Produce in-budget excerpts for the first `max_documents` retrieved
    /// documents, in retrieval-rank order.
    ///
    /// `used_tokens` is what the system prompt and the question already
    /// consume. Truncation goes through the tokenizer (encode, cut,
    /// decode) so each excerpt is valid self-contained text. With zero
    /// retrieved documents (or no budget left) the result is empty and
    /// generation proceeds without evidence.
    ///
    /// # Errors
    ///
    /// Propagates tokenizer failures; the generation controller converts
    /// them into a degraded textual response.
    pub fn excerpts(
        &self,
        tokenizer: &dyn Tokenizer,
        used_tokens: usize,
        documents: &[RetrievedDocument],
    ) -> ModelResult<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let remaining = self
            .max_input_tokens
            .saturating_sub(used_tokens + self.overhead_tokens);
        // Split across however many documents are actually available,
        // never dividing by zero.
        let share = remaining / self.max_documents.min(documents.len()).max(1);
        if share == 0 {
            debug!(used_tokens, "no context budget remains");
            return Ok(Vec::new());
        }

        documents
            .iter()
            .take(self.max_documents)
            .map(|doc| tokenizer.truncate(&doc.text, share))
            .collect()
    }

    pub fn max_documents(&self) -> usize {
        self.max_documents
    }
}
