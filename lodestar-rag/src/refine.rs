//! Heuristic rewriting of low-information queries.

use regex::Regex;

/// Rewrites queries that are too short or too vague to retrieve against.
///
/// Rules apply in priority order; the first that fires wins:
///
/// 1. trimmed length under the minimum → ask for more detail
/// 2. a bare acknowledgement ("ok", "thanks", …) → pass through unchanged
/// 3. a vague referent ("this", "that", "it", "thing") as a whole word →
///    ask what it refers to
/// 4. a coding term ("code", "program", "function") as a whole word →
///    ask to narrow the scope
/// 5. otherwise → unchanged
///
/// Every generated message embeds the literal original query so the
/// caller can always recover what was actually asked. Deterministic and
/// infallible.
#[derive(Debug, Clone)]
pub struct QueryRefiner {
    min_length: usize,
    acknowledgements: Vec<String>,
    vague: Regex,
    coding: Regex,
}

fn whole_word_pattern(terms: &[&str]) -> Regex {
    let escaped: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
    let pattern = format!(r"(?i)\b(?:{})\b", escaped.join("|"));
    // Alternation of escaped literals; cannot fail to compile.
    Regex::new(&pattern).expect("literal alternation is a valid pattern")
}

impl QueryRefiner {
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            acknowledgements: ["ok", "okay", "yes", "no", "thanks", "thank you", "sure"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vague: whole_word_pattern(&["this", "that", "it", "thing"]),
            coding: whole_word_pattern(&["code", "program", "function"]),
        }
    }

    /// Apply the rewrite rules; returns the input unchanged when none fire.
    pub fn refine(&self, query: &str) -> String {
        let trimmed = query.trim();

        if trimmed.chars().count() < self.min_length {
            return format!(
                "Could you provide more detail? Your query \"{query}\" is quite short."
            );
        }

        if self.acknowledgements.iter().any(|ack| ack == &trimmed.to_lowercase()) {
            return query.to_string();
        }

        if self.vague.is_match(trimmed) {
            return format!(
                "Could you be more specific about what \"{query}\" refers to?"
            );
        }

        if self.coding.is_match(trimmed) {
            return format!(
                "Your query \"{query}\" is broad. Which language, library, or problem should it \
                 focus on?"
            );
        }

        query.to_string()
    }
}

impl Default for QueryRefiner {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_query_yields_clarification_with_literal_query() {
        let refiner = QueryRefiner::default();
        let refined = refiner.refine("hi");
        assert_ne!(refined, "hi");
        assert!(refined.contains("hi"));
    }

    #[test]
    fn acknowledgements_pass_unchanged() {
        let refiner = QueryRefiner::default();
        assert_eq!(refiner.refine("thanks"), "thanks");
        assert_eq!(refiner.refine("  Thank you  "), "  Thank you  ");
    }

    #[test]
    fn vague_referent_yields_specificity_request() {
        let refiner = QueryRefiner::default();
        let refined = refiner.refine("explain this please");
        assert!(refined.contains("explain this please"));
        assert!(refined.contains("specific"));
    }

    #[test]
    fn vague_match_is_whole_word_only() {
        let refiner = QueryRefiner::default();
        // "italy" contains "it" but must not trip the vague-referent rule.
        assert_eq!(refiner.refine("history of italy"), "history of italy");
    }

    #[test]
    fn coding_term_yields_scope_request() {
        let refiner = QueryRefiner::default();
        let refined = refiner.refine("help me write code");
        assert!(refined.contains("help me write code"));
        assert_ne!(refined, "help me write code");
    }

    #[test]
    fn short_rule_wins_over_later_rules() {
        let refiner = QueryRefiner::default();
        // "it" is both short and a vague referent; the short rule fires first.
        let refined = refiner.refine("it");
        assert!(refined.contains("quite short"));
    }

    #[test]
    fn ordinary_queries_pass_unchanged() {
        let refiner = QueryRefiner::default();
        let query = "What datasets were used to train large language models?";
        assert_eq!(refiner.refine(query), query);
    }

    #[test]
    fn refinement_is_deterministic() {
        let refiner = QueryRefiner::default();
        assert_eq!(refiner.refine("hm"), refiner.refine("hm"));
    }
}
