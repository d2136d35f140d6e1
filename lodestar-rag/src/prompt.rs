//! Prompt assembly.

/// Composes the final prompt from system instruction, numbered context
/// excerpts, and the question.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
}

impl PromptBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self { system_prompt: system_prompt.into() }
    }

    /// One text block: `{system}\n\nContext:\n{excerpts}\n\nQuestion: {q}\nAnswer:`.
    ///
    /// Excerpts are numbered `[Document 1]`, `[Document 2]`, … in
    /// retrieval-rank order; with no excerpts the context section is
    /// empty and the model answers from the question alone.
    pub fn build(&self, excerpts: &[String], query: &str) -> String {
        let context = excerpts
            .iter()
            .enumerate()
            .map(|(i, excerpt)| format!("[Document {}]: {excerpt}", i + 1))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "{}\n\nContext:\n{context}\n\nQuestion: {query}\nAnswer:",
            self.system_prompt
        )
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}
