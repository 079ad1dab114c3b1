//! Question-list parsing.

use regex::Regex;
use std::sync::LazyLock;

// Single-digit enumeration only: "10. x" is left alone.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9][.)]").unwrap_or_else(|e| panic!("invalid marker regex: {e}"))
});

/// Split model text into questions.
///
/// One question per non-blank line, trimmed, with a leading `1.`–`9.` or
/// `1)`–`9)` marker removed. `None` or blank input gives an empty list.
pub fn parse_questions(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| MARKER_RE.replace(line, "").trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_dot_and_paren_markers() {
        assert_eq!(parse_questions(Some("1. A\n2. B\n3. C")), vec!["A", "B", "C"]);
        assert_eq!(parse_questions(Some("1) A\n2)B")), vec!["A", "B"]);
    }

    #[test]
    fn plain_lines_pass_through() {
        let text = "What is a mutex?\nWhy use channels?";
        assert_eq!(
            parse_questions(Some(text)),
            vec!["What is a mutex?", "Why use channels?"]
        );
    }

    #[test]
    fn blank_lines_and_whitespace_are_dropped() {
        let text = "\n   1. First  \n\n\t\n2. Second\r\n";
        assert_eq!(parse_questions(Some(text)), vec!["First", "Second"]);
    }

    #[test]
    fn multi_digit_indices_are_not_markers() {
        assert_eq!(
            parse_questions(Some("10. Tenth\n0. Zero\n- Dash")),
            vec!["10. Tenth", "0. Zero", "- Dash"]
        );
    }

    #[test]
    fn only_one_marker_is_removed() {
        assert_eq!(parse_questions(Some("1. 2. nested")), vec!["2. nested"]);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(parse_questions(None).is_empty());
        assert!(parse_questions(Some("")).is_empty());
        assert!(parse_questions(Some(" \n \n")).is_empty());
    }

    #[test]
    fn parsing_is_deterministic() {
        let text = "1. Alpha\nBeta\n3) Gamma";
        assert_eq!(parse_questions(Some(text)), parse_questions(Some(text)));
    }
}
