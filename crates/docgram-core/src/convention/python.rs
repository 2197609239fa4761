//! Python docstrings.
//!
//! A docstring is a triple-quoted string that forms a statement of its own.
//! It documents the enclosing `def`/`class` when it is the first statement
//! of that body, otherwise it is free-floating (module docstrings, attribute
//! docstrings, section notes inside a body).

use super::{CommentConvention, Spans, indent_columns};
use crate::span::{DocCommentSpan, SymbolKind};

/// Triple-quoted string convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct TripleQuoted;

impl CommentConvention for TripleQuoted {
    fn name(&self) -> &'static str {
        "python"
    }

    fn spans<'a>(&'a self, text: &'a str) -> Spans<'a> {
        Box::new(Scanner::new(text))
    }
}

/// A `def`/`class` whose docstring has not been seen yet.
struct Header {
    kind: SymbolKind,
    name: String,
    depth: usize,
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Indentation of each open `def`/`class`.
    scopes: Vec<usize>,
    /// Header being parsed, up to its colon.
    header: Option<Header>,
    /// Header whose body has not started yet.
    pending: Option<Header>,
    indent: usize,
    paren: usize,
    line_start: bool,
    stmt_start: bool,
    continued: bool,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            scopes: Vec::new(),
            header: None,
            pending: None,
            indent: 0,
            paren: 0,
            line_start: true,
            stmt_start: false,
            continued: false,
        }
    }

    /// Handle the start of a physical line: close scopes on dedent.
    fn begin_line(&mut self) {
        self.line_start = false;
        if self.paren > 0 || std::mem::take(&mut self.continued) {
            return;
        }

        let rest = &self.text[self.pos..];
        let (indent, content) = indent_columns(rest);
        // Blank and comment-only lines don't affect nesting
        if content.is_empty() || content.starts_with(['\n', '\r', '#']) {
            return;
        }

        self.pos += rest.len() - content.len();
        while self.scopes.last().is_some_and(|&open| open >= indent) {
            self.scopes.pop();
        }
        self.indent = indent;
        self.stmt_start = true;
    }

    fn skip_comment(&mut self) {
        self.pos = self.bytes[self.pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.bytes.len(), |idx| self.pos + idx);
    }

    fn punct(&mut self, byte: u8) {
        self.pos += 1;
        if std::mem::take(&mut self.stmt_start) {
            self.pending = None;
        }
        match byte {
            b'(' | b'[' | b'{' => self.paren += 1,
            b')' | b']' | b'}' => self.paren = self.paren.saturating_sub(1),
            b':' if self.paren == 0 => {
                if let Some(header) = self.header.take() {
                    self.pending = Some(header);
                    self.stmt_start = true;
                }
            }
            b';' if self.paren == 0 => self.stmt_start = true,
            _ => {}
        }
    }

    fn word(&mut self) -> Option<DocCommentSpan> {
        let start = self.pos;
        let end = self.bytes[start..]
            .iter()
            .position(|&b| !is_ident_byte(b))
            .map_or(self.bytes.len(), |idx| start + idx);
        let word = &self.text[start..end];

        if matches!(self.bytes.get(end), Some(b'"' | b'\'')) && is_string_prefix(word) {
            // Byte strings and f-strings are never docstrings
            let doc = !word.contains(['b', 'B', 'f', 'F']);
            return self.string(end, doc);
        }

        self.pos = end;
        if !std::mem::take(&mut self.stmt_start) {
            return None;
        }
        self.pending = None;
        match word {
            "def" => self.open_header(SymbolKind::Function),
            "class" => self.open_header(SymbolKind::Class),
            "async" => self.stmt_start = true,
            _ => {}
        }
        None
    }

    fn open_header(&mut self, kind: SymbolKind) {
        let rest = self.text[self.pos..].trim_start_matches([' ', '\t']);
        let name: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if name.is_empty() {
            return;
        }
        self.header = Some(Header {
            kind,
            name,
            depth: self.scopes.len(),
        });
        self.scopes.push(self.indent);
    }

    /// Consume a string literal whose opening quote is at `quote`.
    fn string(&mut self, quote: usize, doc: bool) -> Option<DocCommentSpan> {
        let q = self.bytes[quote];
        let triple = self.bytes[quote..].starts_with(&[q, q, q]);
        let content_start = quote + if triple { 3 } else { 1 };
        let (content_end, next, terminated) = self.string_end(content_start, q, triple);
        self.pos = next;

        let stmt_start = std::mem::take(&mut self.stmt_start);
        let pending = if stmt_start { self.pending.take() } else { None };
        if !(stmt_start && triple && doc) {
            return None;
        }
        if self.text[content_start..content_end].trim().is_empty() {
            return None;
        }

        let mut span = DocCommentSpan::floating(content_start, content_end, self.scopes.len());
        if let Some(header) = pending {
            span = span.attached(header.kind, header.name, header.depth);
        }
        if !terminated {
            span = span.unterminated();
        }
        Some(span)
    }

    /// Returns `(content_end, next_pos, terminated)`.
    fn string_end(&self, from: usize, q: u8, triple: bool) -> (usize, usize, bool) {
        let mut i = from;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' if !triple => return (i, i, false),
                c if c == q => {
                    if !triple {
                        return (i, i + 1, true);
                    }
                    if self.bytes[i..].starts_with(&[q, q, q]) {
                        return (i, i + 3, true);
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        (self.bytes.len(), self.bytes.len(), false)
    }
}

impl Iterator for Scanner<'_> {
    type Item = DocCommentSpan;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.line_start {
                self.begin_line();
            }
            let &byte = self.bytes.get(self.pos)?;
            match byte {
                b'\n' => {
                    self.pos += 1;
                    self.line_start = true;
                }
                b' ' | b'\t' | b'\r' | b'\x0c' => self.pos += 1,
                b'#' => self.skip_comment(),
                b'\\' => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'\r') {
                        self.pos += 1;
                    }
                    if self.bytes.get(self.pos) == Some(&b'\n') {
                        self.pos += 1;
                        self.line_start = true;
                        self.continued = true;
                    }
                }
                b'"' | b'\'' => {
                    if let Some(span) = self.string(self.pos, true) {
                        return Some(span);
                    }
                }
                b if is_ident_start(b) => {
                    if let Some(span) = self.word() {
                        return Some(span);
                    }
                }
                b => self.punct(b),
            }
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn is_string_prefix(word: &str) -> bool {
    word.len() <= 2 && word.chars().all(|c| "rRuUbBfF".contains(c))
}
