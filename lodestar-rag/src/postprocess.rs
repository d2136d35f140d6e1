//! Response cleanup and citation rendering.

use crate::document::RetrievedDocument;

/// Clean a raw model completion for terminal display.
///
/// Strips the echoed prompt when the backend returns input and output
/// concatenated, collapses newline and carriage-return runs into single
/// spaces, trims, and wraps to `width` columns.
pub fn clean_response(raw: &str, prompt: &str, width: usize) -> String {
    let stripped = raw.strip_prefix(prompt).unwrap_or(raw);
    let collapsed = collapse_line_breaks(stripped);
    wrap(collapsed.trim(), width)
}

/// Replace every run of `\n`/`\r` (and surrounding spaces) with one space.
fn collapse_line_breaks(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Greedy word wrap at `width` columns. Words longer than the width get a
/// line of their own rather than being broken.
pub fn wrap(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Render a numbered source list, one line per document, each carrying the
/// first `excerpt_chars` characters of the source text.
///
/// Presentation-layer helper: the structured sources are always returned
/// alongside the response, and callers decide whether to append this.
pub fn render_citations(sources: &[RetrievedDocument], excerpt_chars: usize) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut out = String::from("Sources:");
    for (i, source) in sources.iter().enumerate() {
        let excerpt: String = source.text.chars().take(excerpt_chars).collect();
        let ellipsis = if source.text.chars().count() > excerpt_chars { "..." } else { "" };
        out.push_str(&format!("\n{}. {excerpt}{ellipsis}", i + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoed_prompt_is_stripped() {
        let prompt = "System.\n\nQuestion: q\nAnswer:";
        let raw = format!("{prompt} The answer is 42.");
        let cleaned = clean_response(&raw, prompt, 76);
        assert_eq!(cleaned, "The answer is 42.");
    }

    #[test]
    fn completion_without_echo_is_kept_whole() {
        let cleaned = clean_response("Plain answer.", "some unrelated prompt", 76);
        assert_eq!(cleaned, "Plain answer.");
    }

    #[test]
    fn line_breaks_collapse_to_single_spaces() {
        let cleaned = clean_response("one\ntwo\r\nthree\n\n\nfour", "", 76);
        assert_eq!(cleaned, "one two three four");
    }

    #[test]
    fn wrap_respects_column_width() {
        let text = "word ".repeat(60);
        let wrapped = wrap(&text, 76);
        for line in wrapped.lines() {
            assert!(line.chars().count() <= 76, "line too long: {line:?}");
        }
    }

    #[test]
    fn wrap_leaves_overlong_words_unbroken() {
        let long_word = "x".repeat(100);
        let wrapped = wrap(&format!("start {long_word} end"), 76);
        assert!(wrapped.lines().any(|line| line == long_word));
    }

    #[test]
    fn citations_number_sources_and_truncate_excerpts() {
        let sources = vec![
            RetrievedDocument { index: 4, text: "a".repeat(150), distance: 0.1 },
            RetrievedDocument { index: 9, text: "short doc".to_string(), distance: 0.2 },
        ];
        let rendered = render_citations(&sources, 100);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Sources:");
        assert!(lines[1].starts_with("1. "));
        assert!(lines[1].ends_with("..."));
        assert_eq!(lines[1].len(), "1. ".len() + 100 + 3);
        assert_eq!(lines[2], "2. short doc");
    }

    #[test]
    fn citations_for_no_sources_are_empty() {
        assert_eq!(render_citations(&[], 100), "");
    }
}
