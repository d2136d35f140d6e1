//! Topic gating via a fixed denylist.

/// Decides whether a query is permitted at all.
///
/// Matching is case-insensitive substring search over a configured topic
/// denylist plus an optional list of command-injection-like tokens. A
/// substring match over-blocks ("privacy policy" trips on "privacy") and
/// that is accepted: the filter stays trivially auditable and never
/// misfires in the other direction for listed terms.
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    denylist: Vec<String>,
    injection_tokens: Vec<String>,
}

impl SafetyFilter {
    /// Filter with the given topic denylist; terms are matched
    /// case-insensitively.
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            denylist: topics.into_iter().map(|t| t.into().to_lowercase()).collect(),
            injection_tokens: Vec::new(),
        }
    }

    /// Additionally reject queries containing shell-fragment tokens.
    pub fn with_injection_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.injection_tokens = tokens.into_iter().map(|t| t.into().to_lowercase()).collect();
        self
    }

    /// `false` if any denylisted topic or injection token occurs in the
    /// query, ignoring case. Pure; never fails.
    pub fn is_allowed(&self, query: &str) -> bool {
        let lowered = query.to_lowercase();
        !self
            .denylist
            .iter()
            .chain(self.injection_tokens.iter())
            .any(|term| lowered.contains(term))
    }
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new(["violence", "illegal", "hate", "privacy"]).with_injection_tokens([
            "rm -rf", "sudo ", "$(", "`", "; sh", "| sh",
        ])
    }
}
