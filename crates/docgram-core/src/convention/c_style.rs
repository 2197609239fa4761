//! Brace-delimited languages: `/** ... */` blocks and `///` line runs.
//!
//! Nesting is tracked by counting braces. A brace opened right after a
//! declaration line is a symbol scope; any other brace is anonymous and does
//! not contribute to depth.

use super::declaration::{self, Declaration};
use super::{CommentConvention, Spans, line_bounds};
use crate::span::{DocCommentSpan, Leader};

/// Lexical settings of one brace-delimited language.
#[derive(Debug, Clone, Copy)]
pub struct CStyle {
    name: &'static str,
    /// Block comment openers that mark documentation (`/**`, `/*!`).
    block_openers: &'static [&'static str],
    /// Line comment prefixes that mark documentation (`///`, `//!`).
    line_prefixes: &'static [&'static str],
    /// Openers and prefixes that document the enclosing item (Rust `//!`).
    inner_markers: &'static [&'static str],
    /// String delimiters.
    quotes: &'static [u8],
    /// `'x'` is a character literal rather than a string.
    char_literals: bool,
    /// `"` strings may contain raw newlines.
    multiline_strings: bool,
    /// `r#"..."#` raw strings.
    raw_strings: bool,
    /// `"""..."""` text blocks.
    triple_quotes: bool,
}

const BASE: CStyle = CStyle {
    name: "generic",
    block_openers: &["/**"],
    line_prefixes: &[],
    inner_markers: &[],
    quotes: b"\"",
    char_literals: true,
    multiline_strings: false,
    raw_strings: false,
    triple_quotes: false,
};

impl CStyle {
    /// Fallback for unknown languages: every `/* */` comment is a candidate.
    pub const fn generic() -> Self {
        Self {
            block_openers: &["/*"],
            char_literals: false,
            ..BASE
        }
    }

    pub const fn rust() -> Self {
        Self {
            name: "rust",
            block_openers: &["/**", "/*!"],
            line_prefixes: &["///", "//!"],
            inner_markers: &["/*!", "//!"],
            multiline_strings: true,
            raw_strings: true,
            ..BASE
        }
    }

    /// JavaScript, TypeScript and their JSX variants.
    pub const fn javascript(name: &'static str) -> Self {
        Self {
            name,
            quotes: b"\"'`",
            char_literals: false,
            ..BASE
        }
    }

    /// C, C++ and Objective-C (Doxygen comments).
    ///
    /// Qt-style `/*!` and `//!` document the next declaration, like `/**`.
    pub const fn c(name: &'static str) -> Self {
        Self {
            name,
            block_openers: &["/**", "/*!"],
            line_prefixes: &["///", "//!"],
            ..BASE
        }
    }

    /// Java, Kotlin and Scala.
    pub const fn jvm(name: &'static str) -> Self {
        Self {
            name,
            triple_quotes: true,
            ..BASE
        }
    }

    pub const fn csharp() -> Self {
        Self {
            name: "csharp",
            line_prefixes: &["///"],
            ..BASE
        }
    }

    pub const fn swift() -> Self {
        Self {
            name: "swift",
            line_prefixes: &["///"],
            char_literals: false,
            triple_quotes: true,
            ..BASE
        }
    }

    pub const fn dart() -> Self {
        Self {
            name: "dart",
            line_prefixes: &["///"],
            quotes: b"\"'",
            char_literals: false,
            triple_quotes: true,
            ..BASE
        }
    }

    /// Go documents declarations with plain `//` runs.
    pub const fn go() -> Self {
        Self {
            name: "go",
            block_openers: &["/*"],
            line_prefixes: &["//"],
            quotes: b"\"`",
            ..BASE
        }
    }

    pub const fn php() -> Self {
        Self {
            name: "php",
            quotes: b"\"'",
            char_literals: false,
            ..BASE
        }
    }
}

impl CommentConvention for CStyle {
    fn name(&self) -> &'static str {
        self.name
    }

    fn spans<'a>(&'a self, text: &'a str) -> Spans<'a> {
        Box::new(Scanner {
            style: self,
            text,
            bytes: text.as_bytes(),
            pos: 0,
            line_start: true,
            paren: 0,
            scopes: Vec::new(),
            pending: false,
        })
    }
}

struct Scanner<'a> {
    style: &'a CStyle,
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line_start: bool,
    paren: usize,
    /// One entry per open brace: `true` when it opened a symbol body.
    scopes: Vec<bool>,
    /// A declaration was seen and its body brace has not opened yet.
    pending: bool,
}

impl Scanner<'_> {
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn depth(&self) -> usize {
        self.scopes.iter().filter(|named| **named).count()
    }

    /// Rest of the current line, without its terminator.
    fn line_rest(&self) -> &str {
        let (end, _) = line_bounds(self.text, self.pos);
        &self.text[self.pos..end]
    }

    fn line_comment(&mut self, at_line_start: bool) -> Option<DocCommentSpan> {
        let start = self.pos;
        let line = self.line_rest();
        let prefix = self
            .style
            .line_prefixes
            .iter()
            .copied()
            .find(|prefix| is_doc_prefix(line, prefix));

        let (first_end, mut cursor) = line_bounds(self.text, start);
        self.pos = first_end;
        let prefix = prefix.filter(|_| at_line_start)?;

        let mut end = first_end;
        while cursor < self.text.len() {
            let (line_end, next) = line_bounds(self.text, cursor);
            if !is_doc_prefix(self.text[cursor..line_end].trim_start(), prefix) {
                break;
            }
            end = line_end;
            cursor = next;
        }
        self.pos = end;

        let leader = Leader::Prefix(prefix);
        if leader.strip_lines(&self.text[start..end]).trim().is_empty() {
            return None;
        }
        let inner = self.style.inner_markers.contains(&prefix);
        Some(self.span(start, end, leader, inner, true))
    }

    fn block_comment(&mut self) -> Option<DocCommentSpan> {
        let rest = &self.text[self.pos..];
        let opener = self
            .style
            .block_openers
            .iter()
            .copied()
            .find(|opener| is_doc_opener(rest, opener));

        let content_start = self.pos + opener.map_or(2, str::len);
        let (content_end, terminated) = match self.text[content_start..].find("*/") {
            Some(idx) => (content_start + idx, true),
            None => (self.text.len(), false),
        };
        self.pos = if terminated {
            content_end + 2
        } else {
            content_end
        };

        let opener = opener?;
        let content = &self.text[content_start..content_end];
        if content.trim().is_empty() {
            return None;
        }
        let leader = Leader::detect_star(content);
        Some(self.span(
            content_start,
            content_end,
            leader,
            self.style.inner_markers.contains(&opener),
            terminated,
        ))
    }

    fn span(
        &self,
        start: usize,
        end: usize,
        leader: Leader,
        inner: bool,
        terminated: bool,
    ) -> DocCommentSpan {
        let depth = self.depth();
        let mut span = DocCommentSpan::floating(start, end, depth).with_leader(leader);
        if !inner && let Some(decl) = self.attached_declaration() {
            span = span.attached(decl.kind, decl.name, depth);
        }
        if !terminated {
            span = span.unterminated();
        }
        span
    }

    /// Declaration documented by the comment that ends at `self.pos`.
    fn attached_declaration(&self) -> Option<Declaration> {
        let trailing = self.line_rest();
        if !trailing.trim().is_empty() {
            return declaration::parse_c_style(trailing);
        }

        let (_, next) = line_bounds(self.text, self.pos);
        self.text[next..]
            .lines()
            .find(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty()
                    && !declaration::is_decoration(line)
                    && !(trimmed.starts_with("//") && !trimmed.starts_with("///"))
            })
            .and_then(declaration::parse_c_style)
    }

    fn skip_string(&mut self, quote: u8) {
        let triple = self.style.triple_quotes && self.bytes[self.pos..].starts_with(&[quote; 3]);
        let multiline = triple || quote == b'`' || self.style.multiline_strings;
        let mut i = self.pos + if triple { 3 } else { 1 };
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' if !multiline => break,
                c if c == quote => {
                    if !triple {
                        i += 1;
                        break;
                    }
                    if self.bytes[i..].starts_with(&[quote; 3]) {
                        i += 3;
                        break;
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        self.pos = i.min(self.bytes.len());
    }

    /// `'x'`, `'\n'` and `'\u{1F600}'` are literals; `'a` lifetimes are not.
    fn skip_char_literal(&mut self) {
        let rest = &self.text[self.pos + 1..];
        let close = match rest.as_bytes().first() {
            Some(b'\\') => rest
                .bytes()
                .skip(2)
                .take(10)
                .position(|b| b == b'\'')
                .map(|idx| idx + 2),
            Some(_) => rest
                .chars()
                .next()
                .map(char::len_utf8)
                .filter(|&len| rest.as_bytes().get(len) == Some(&b'\'')),
            None => None,
        };
        self.pos += close.map_or(1, |close| close + 2);
    }

    /// Skip an identifier, or a raw string literal introduced by one.
    fn skip_word(&mut self) {
        if self.style.raw_strings && self.skip_raw_string() {
            return;
        }
        while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn skip_raw_string(&mut self) -> bool {
        let mut i = self.pos;
        if self.bytes[i] == b'b' {
            i += 1;
        }
        if self.bytes.get(i) != Some(&b'r') {
            return false;
        }
        i += 1;
        let hashes = self.bytes[i..].iter().take_while(|&&b| b == b'#').count();
        i += hashes;
        if self.bytes.get(i) != Some(&b'"') {
            return false;
        }

        let closing: Vec<u8> = std::iter::once(b'"')
            .chain(std::iter::repeat_n(b'#', hashes))
            .collect();
        self.pos = self.bytes[i + 1..]
            .windows(closing.len())
            .position(|window| window == closing.as_slice())
            .map_or(self.bytes.len(), |idx| i + 1 + idx + closing.len());
        true
    }
}

impl Iterator for Scanner<'_> {
    type Item = DocCommentSpan;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.bytes.len() {
            let byte = self.bytes[self.pos];
            if byte == b'\n' {
                self.line_start = true;
                self.pos += 1;
                continue;
            }
            if byte.is_ascii_whitespace() {
                self.pos += 1;
                continue;
            }

            let at_line_start = std::mem::take(&mut self.line_start);
            if at_line_start && self.paren == 0 && declaration::parse_c_style(self.line_rest()).is_some()
            {
                self.pending = true;
            }

            match byte {
                b'/' if self.peek(1) == Some(b'/') => {
                    if let Some(span) = self.line_comment(at_line_start) {
                        return Some(span);
                    }
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let span = self.block_comment();
                    // Code after a leading comment still starts the line
                    self.line_start = at_line_start;
                    if let Some(span) = span {
                        return Some(span);
                    }
                }
                b'{' => {
                    self.scopes.push(std::mem::take(&mut self.pending));
                    self.pos += 1;
                }
                b'}' => {
                    self.scopes.pop();
                    self.pending = false;
                    self.pos += 1;
                }
                b'(' => {
                    self.paren += 1;
                    self.pos += 1;
                }
                b')' => {
                    self.paren = self.paren.saturating_sub(1);
                    self.pos += 1;
                }
                b';' => {
                    if self.paren == 0 {
                        self.pending = false;
                    }
                    self.pos += 1;
                }
                b'\'' if self.style.char_literals => self.skip_char_literal(),
                quote if self.style.quotes.contains(&quote) => self.skip_string(quote),
                b if is_ident_byte(b) => self.skip_word(),
                _ => self.pos += 1,
            }
        }
        None
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// `///` documents, `////` is a separator line.
fn is_doc_prefix(line: &str, prefix: &str) -> bool {
    line.strip_prefix(prefix)
        .is_some_and(|rest| prefix == "//" || !rest.starts_with('/'))
}

/// `/**` documents, `/**/` and `/*****` banners do not.
fn is_doc_opener(rest: &str, opener: &str) -> bool {
    rest.strip_prefix(opener).is_some_and(|after| {
        opener == "/*" || !(after.starts_with('*') || after.starts_with('/'))
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::span::SymbolKind;

    fn spans(style: CStyle, text: &str) -> Vec<DocCommentSpan> {
        style.spans(text).collect()
    }

    fn attribution(style: CStyle, text: &str) -> Vec<(SymbolKind, Option<String>, usize)> {
        spans(style, text)
            .into_iter()
            .map(|s| (s.symbol_kind, s.symbol_name, s.depth))
            .collect()
    }

    #[test]
    fn test_javadoc_on_class_and_method() {
        let text = r"/**
 * Parser states.
 */
public class Parser {
    /**
     * Advance one token.
     */
    @Override
    public void advance() {
        if (ready) {
            run();
        }
    }
}
";
        let spans = spans(CStyle::jvm("java"), text);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].symbol_kind, SymbolKind::Class);
        assert_eq!(spans[0].symbol_name.as_deref(), Some("Parser"));
        assert_eq!(spans[0].depth, 0);
        assert_eq!(spans[0].leader, Leader::Star);
        assert_eq!(spans[0].text(text), "\n * Parser states.\n ");
        assert_eq!(spans[1].symbol_name.as_deref(), Some("advance"));
        assert_eq!(spans[1].depth, 1);
    }

    #[test]
    fn test_rust_line_runs() {
        let text = r#"//! Crate docs.

/// A parser.
///
/// Keeps state.
#[derive(Debug)]
pub struct Parser;

impl Parser {
    /// Parse input.
    pub fn parse(&self) -> &'static str {
        "/** not a comment */"
    }
}
"#;
        assert_eq!(
            attribution(CStyle::rust(), text),
            vec![
                (SymbolKind::None, None, 0),
                (SymbolKind::Class, Some("Parser".to_owned()), 0),
                (SymbolKind::Function, Some("parse".to_owned()), 1),
            ]
        );
        let spans = spans(CStyle::rust(), text);
        assert_eq!(spans[1].text(text), "/// A parser.\n///\n/// Keeps state.");
        assert_eq!(spans[1].leader, Leader::Prefix("///"));
    }

    #[test]
    fn test_plain_comments_are_not_docs() {
        let text = "// plain\n/* plain */\n//// banner\n/*****/\n/**/\nfn main() {}\n";
        assert!(spans(CStyle::rust(), text).is_empty());
    }

    #[test]
    fn test_trailing_line_comment_is_not_doc() {
        let text = "let x = 1; /// trailing\nfn f() {}\n";
        assert!(spans(CStyle::rust(), text).is_empty());
    }

    #[test]
    fn test_strings_hide_comment_openers() {
        let text = "const a = \"/** no */\";\nconst b = '/** no */';\nconst c = `\n/** no */\n`;\n/** yes */\nfunction f() {}\n";
        let spans = spans(CStyle::javascript("javascript"), text);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text(text), " yes ");
        assert_eq!(spans[0].symbol_name.as_deref(), Some("f"));
    }

    #[test]
    fn test_rust_lifetimes_and_raw_strings() {
        let text = "fn f<'a>(s: &'a str) -> char {\n    let _ = r##\"/** \"# no */\"##;\n    '{'\n}\n/** After. */\nfn g() {}\n";
        assert_eq!(
            attribution(CStyle::rust(), text),
            vec![(SymbolKind::Function, Some("g".to_owned()), 0)]
        );
    }

    #[test]
    fn test_anonymous_braces_do_not_count() {
        let text = "function outer() {\n  if (x) {\n    /** Inside. */\n    const inner = () => {};\n  }\n}\n";
        assert_eq!(
            attribution(CStyle::javascript("javascript"), text),
            vec![(SymbolKind::Function, Some("inner".to_owned()), 1)]
        );
    }

    #[test]
    fn test_same_line_declaration() {
        let text = "/** Size. */ int size() { return n; }\n";
        assert_eq!(
            attribution(CStyle::c("c"), text),
            vec![(SymbolKind::Function, Some("size".to_owned()), 0)]
        );
    }

    #[test]
    fn test_floating_comment_inside_body() {
        let text = "class A {\n  /** Section. */\n\n  // note\n  x = 1;\n}\n";
        assert_eq!(
            attribution(CStyle::javascript("typescript"), text),
            vec![(SymbolKind::None, None, 1)]
        );
    }

    #[test]
    fn test_inner_doc_never_attaches() {
        let text = "/*! Module. */\nfn main() {}\n";
        assert_eq!(attribution(CStyle::rust(), text), vec![(SymbolKind::None, None, 0)]);
    }

    #[test]
    fn test_qt_style_doxygen_attaches() {
        let text = "/*!\n * Reads the header.\n */\nint parse_header(const char *buf) {\n    return 0;\n}\n";
        assert_eq!(
            attribution(CStyle::c("c"), text),
            vec![(SymbolKind::Function, Some("parse_header".to_owned()), 0)]
        );

        let text = "//! Token stream.\nclass Parser {\n};\n";
        assert_eq!(
            attribution(CStyle::c("cpp"), text),
            vec![(SymbolKind::Class, Some("Parser".to_owned()), 0)]
        );
    }

    #[test]
    fn test_rust_inner_line_doc_never_attaches() {
        let text = "//! Crate docs.\npub struct Parser;\n";
        assert_eq!(attribution(CStyle::rust(), text), vec![(SymbolKind::None, None, 0)]);
    }

    #[test]
    fn test_rust_module_is_a_scope() {
        let text = "/// Wiring.\nmod pipeline {\n    /// Stage.\n    pub fn run() {}\n}\n";
        assert_eq!(
            attribution(CStyle::rust(), text),
            vec![
                (SymbolKind::Class, Some("pipeline".to_owned()), 0),
                (SymbolKind::Function, Some("run".to_owned()), 1),
            ]
        );
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        let text = "/** Open\n * ```mermaid\n";
        let spans = spans(CStyle::generic(), text);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end, text.len());
        assert!(!spans[0].terminated);
    }

    #[test]
    fn test_generic_accepts_any_block_comment() {
        let text = "/* Plain block. */\nrule {\n}\n";
        assert_eq!(spans(CStyle::generic(), text).len(), 1);
    }

    #[test]
    fn test_go_line_runs() {
        let text = "package flow\n\n// Parser reads graphs.\n// It is not safe for concurrent use.\ntype Parser struct {\n\tsrc string // trailing\n}\n";
        assert_eq!(
            attribution(CStyle::go(), text),
            vec![(SymbolKind::Class, Some("Parser".to_owned()), 0)]
        );
    }
}
