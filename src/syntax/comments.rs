//! Comment groups and their cleaned-up text.

use smol_str::SmolStr;

use crate::base::{FileId, TextRange};

/// A run of adjacent comments with no blank line or token between them.
///
/// `list` holds the raw comment tokens, markers included (`// foo`,
/// `/* bar */`). The range covers the whole group and identifies it
/// within its file.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CommentGroup {
    pub file: FileId,
    pub range: TextRange,
    pub list: Vec<SmolStr>,
}

impl CommentGroup {
    pub fn new(file: FileId, range: TextRange, list: Vec<SmolStr>) -> Self {
        Self { file, range, list }
    }

    /// The comment text with markers removed, following `go/ast`.
    ///
    /// A single leading space after `//` is dropped, directive comments
    /// (`//go:generate`, `//line`, ...) are skipped, trailing whitespace is
    /// trimmed, leading blank lines are removed and interior runs of blank
    /// lines collapse to one. A non-empty result ends in exactly one
    /// newline.
    pub fn text(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for raw in &self.list {
            let body = if let Some(rest) = raw.strip_prefix("//") {
                if is_directive(rest) {
                    continue;
                }
                rest.strip_prefix(' ').unwrap_or(rest)
            } else if let Some(rest) = raw.strip_prefix("/*") {
                rest.strip_suffix("*/").unwrap_or(rest)
            } else {
                raw.as_str()
            };
            lines.extend(body.split('\n').map(str::trim_end));
        }

        let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
        for line in lines {
            if !line.is_empty() || kept.last().is_some_and(|prev| !prev.is_empty()) {
                kept.push(line);
            }
        }
        if kept.last().is_some_and(|last| !last.is_empty()) {
            kept.push("");
        }
        kept.join("\n")
    }
}

/// `//line`, `//extern`, `//export` and `//tool:name` style comments.
fn is_directive(body: &str) -> bool {
    if body.starts_with("line ") || body.starts_with("extern ") || body.starts_with("export ") {
        return true;
    }
    let Some(colon) = body.find(':') else {
        return false;
    };
    let is_word = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    colon > 0
        && body[..colon].chars().all(is_word)
        && body[colon + 1..].chars().next().is_some_and(is_word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    fn make_group(list: &[&str]) -> CommentGroup {
        CommentGroup::new(
            FileId::new(0),
            TextRange::new(TextSize::from(0), TextSize::from(1)),
            list.iter().map(|s| SmolStr::new(s)).collect(),
        )
    }

    #[test]
    fn test_line_comments() {
        let group = make_group(&["// Foo does things.", "//", "// More text.  "]);
        assert_eq!(group.text(), "Foo does things.\n\nMore text.\n");
    }

    #[test]
    fn test_block_comment_and_blank_runs() {
        let group = make_group(&["/*\n\nfirst\n\n\n\nsecond\n*/"]);
        assert_eq!(group.text(), "first\n\nsecond\n");
    }

    #[test]
    fn test_directives_are_skipped() {
        let group = make_group(&["// Doc line.", "//go:generate stringer -type=T"]);
        assert_eq!(group.text(), "Doc line.\n");
    }

    #[test]
    fn test_empty_group_has_empty_text() {
        assert_eq!(make_group(&["//"]).text(), "");
        assert_eq!(make_group(&["//nolint:errcheck"]).text(), "");
    }

    #[test]
    fn test_only_one_space_is_stripped() {
        let group = make_group(&["//   indented"]);
        assert_eq!(group.text(), "  indented\n");
    }
}
