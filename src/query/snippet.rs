// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contextual line-snippet extraction for search results.

use serde::Serialize;

/// Maximum number of lines included in one snippet.
pub const MAX_SNIPPET_LINES: usize = 3;

/// One line of a snippet, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetLine {
    pub line: usize,
    pub text: String,
}

/// Pick the first lines (in file order) containing any matched term,
/// case-insensitively, up to [`MAX_SNIPPET_LINES`]. When no line matches
/// (substring token overlap can score a document without any full-line
/// hit), fall back to the first lines of the file.
pub fn extract(content: &str, matched_terms: &[String]) -> Vec<SnippetLine> {
    let mut matches = Vec::new();
    for (i, text) in content.lines().enumerate() {
        let lower = text.to_lowercase();
        if matched_terms.iter().any(|term| lower.contains(term.as_str())) {
            matches.push(SnippetLine {
                line: i + 1,
                text: text.to_string(),
            });
            if matches.len() == MAX_SNIPPET_LINES {
                return matches;
            }
        }
    }
    if !matches.is_empty() {
        return matches;
    }

    content
        .lines()
        .take(MAX_SNIPPET_LINES)
        .enumerate()
        .map(|(i, text)| SnippetLine {
            line: i + 1,
            text: text.to_string(),
        })
        .collect()
}

/// Join snippet lines as `<line>: <text>` for display and JSON payloads.
pub fn render(lines: &[SnippetLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}: {}", l.line, l.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_matching_line_with_number() {
        let mut content = String::new();
        for i in 1..=50 {
            if i == 42 {
                content.push_str("fn authenticate(user: &User) -> bool {\n");
            } else {
                content.push_str(&format!("// filler {i}\n"));
            }
        }
        let lines = extract(&content, &terms(&["authenticate"]));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line, 42);
        assert!(lines[0].text.contains("authenticate"));
        assert!(render(&lines).starts_with("42: "));
    }

    #[test]
    fn caps_at_three_lines_in_file_order() {
        let content = "hit one\nmiss\nhit two\nhit three\nhit four\n";
        let lines = extract(content, &terms(&["hit"]));
        assert_eq!(
            lines.iter().map(|l| l.line).collect::<Vec<_>>(),
            vec![1, 3, 4]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let lines = extract("CallAuthenticate()\n", &terms(&["authenticate"]));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line, 1);
    }

    #[test]
    fn falls_back_to_first_lines() {
        let content = "alpha\nbeta\ngamma\ndelta\n";
        let lines = extract(content, &terms(&["missing"]));
        assert_eq!(
            lines.iter().map(|l| l.line).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(lines[0].text, "alpha");
    }

    #[test]
    fn empty_content_yields_empty_snippet() {
        assert!(extract("", &terms(&["anything"])).is_empty());
    }
}
