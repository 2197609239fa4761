//! Documentation comment spans produced by the locator.

use std::borrow::Cow;

/// Kind of symbol a documentation comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SymbolKind {
    /// Free-floating comment (module docstring, section comment, ...).
    #[default]
    None,
    /// Function, method or arrow function.
    Function,
    /// Class-like declaration (class, struct, trait, interface, module, ...).
    Class,
}

impl SymbolKind {
    /// Lower-case name used in human-readable output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Function => "function",
            Self::Class => "class",
        }
    }
}

/// Per-line decoration a comment style puts in front of its content.
///
/// Fence recognition and render-ready sources ignore the leader, while
/// offsets always refer to the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Leader {
    /// Content lines are used as-is (docstrings, plain block comments).
    #[default]
    None,
    /// Javadoc-style gutter: optional indentation, `*`, one optional space.
    Star,
    /// Line comment prefix such as `///`, `#` or `--`, then one optional space.
    Prefix(&'static str),
}

impl Leader {
    /// Strip the leader from a single line (without its terminator).
    ///
    /// Lines that do not carry the leader are returned unchanged.
    #[must_use]
    pub fn strip(self, line: &str) -> &str {
        let marker = match self {
            Self::None => return line,
            Self::Star => "*",
            Self::Prefix(prefix) => prefix,
        };
        let trimmed = line.trim_start_matches([' ', '\t']);
        match trimmed.strip_prefix(marker) {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
            None => line,
        }
    }

    /// Strip the leader from every line of `text`, keeping line terminators.
    #[must_use]
    pub fn strip_lines(self, text: &str) -> Cow<'_, str> {
        if self == Self::None {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            out.push_str(self.strip(content));
            out.push_str(&line[content.len()..]);
        }
        Cow::Owned(out)
    }

    /// Detect a Javadoc gutter in block comment content.
    ///
    /// Returns [`Leader::Star`] when every non-blank line after the first
    /// starts with `*` (after indentation), otherwise [`Leader::None`].
    #[must_use]
    pub fn detect_star(content: &str) -> Self {
        let mut rest = content.lines().skip(1).filter(|l| !l.trim().is_empty());
        let mut any = false;
        let all = rest.all(|line| {
            any = true;
            line.trim_start().starts_with('*')
        });
        if any && all { Self::Star } else { Self::None }
    }
}

/// One contiguous documentation comment, in document order.
///
/// `start..end` covers the comment content: delimiters such as `"""`, `/**`
/// and `*/` are excluded, line-comment runs keep their prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocCommentSpan {
    /// Byte offset of the first content byte.
    pub start: usize,
    /// Byte offset one past the last content byte.
    pub end: usize,
    /// Kind of the symbol this comment documents.
    pub symbol_kind: SymbolKind,
    /// Name of the documented symbol (`None` for free-floating comments).
    pub symbol_name: Option<String>,
    /// Number of symbol scopes enclosing the documented symbol, or enclosing
    /// the comment itself when it is free-floating.
    pub depth: usize,
    /// Per-line decoration of this comment.
    pub leader: Leader,
    /// `false` when the closing delimiter was missing and the span was cut
    /// at end of input.
    pub terminated: bool,
}

impl DocCommentSpan {
    /// Free-floating span with no symbol attribution.
    #[must_use]
    pub fn floating(start: usize, end: usize, depth: usize) -> Self {
        Self {
            start,
            end,
            symbol_kind: SymbolKind::None,
            symbol_name: None,
            depth,
            leader: Leader::None,
            terminated: true,
        }
    }

    /// Attribute this span to a symbol.
    #[must_use]
    pub fn attached(mut self, kind: SymbolKind, name: impl Into<String>, depth: usize) -> Self {
        self.symbol_kind = kind;
        self.symbol_name = Some(name.into());
        self.depth = depth;
        self
    }

    /// Set the per-line leader.
    #[must_use]
    pub fn with_leader(mut self, leader: Leader) -> Self {
        self.leader = leader;
        self
    }

    /// Mark the span as cut at end of input.
    #[must_use]
    pub fn unterminated(mut self) -> Self {
        self.terminated = false;
        self
    }

    /// Comment content within `text`.
    #[must_use]
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_none_is_identity() {
        assert_eq!(Leader::None.strip("  * item"), "  * item");
    }

    #[test]
    fn test_strip_star() {
        assert_eq!(Leader::Star.strip(" * ```mermaid"), "```mermaid");
        assert_eq!(Leader::Star.strip("\t*   A --> B"), "  A --> B");
        assert_eq!(Leader::Star.strip(" *"), "");
        assert_eq!(Leader::Star.strip("no gutter"), "no gutter");
    }

    #[test]
    fn test_strip_prefix() {
        let leader = Leader::Prefix("///");
        assert_eq!(leader.strip("    /// graph TD"), "graph TD");
        assert_eq!(leader.strip("///    A --> B"), "   A --> B");
        assert_eq!(leader.strip("let x = 1;"), "let x = 1;");
    }

    #[test]
    fn test_strip_lines_keeps_terminators() {
        let text = " * graph LR\r\n *   A --> B\n";
        assert_eq!(Leader::Star.strip_lines(text), "graph LR\r\n  A --> B\n");
    }

    #[test]
    fn test_strip_lines_none_borrows() {
        let text = "graph TD\n  A --> B";
        assert!(matches!(Leader::None.strip_lines(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_detect_star() {
        assert_eq!(
            Leader::detect_star("*\n * Summary.\n *\n * More.\n "),
            Leader::Star
        );
        assert_eq!(Leader::detect_star(" Summary\n   more text\n"), Leader::None);
        assert_eq!(Leader::detect_star(" single line "), Leader::None);
    }

    #[test]
    fn test_span_builders() {
        let span = DocCommentSpan::floating(3, 10, 1)
            .attached(SymbolKind::Class, "Parser", 0)
            .with_leader(Leader::Star)
            .unterminated();

        assert_eq!(span.symbol_kind, SymbolKind::Class);
        assert_eq!(span.symbol_name.as_deref(), Some("Parser"));
        assert_eq!(span.depth, 0);
        assert_eq!(span.leader, Leader::Star);
        assert!(!span.terminated);
        assert_eq!(span.text("0123456789abc"), "3456789");
    }
}
