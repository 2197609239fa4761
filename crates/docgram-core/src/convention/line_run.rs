//! Line-comment languages: runs of `#` or `--` lines.
//!
//! Code lines are lexed just enough to skip string literals and heredoc
//! bodies, so comment look-alikes inside them are not reported.

use super::declaration;
use super::{CommentConvention, Spans, indent_columns, line_bounds};
use crate::span::{DocCommentSpan, Leader};

/// Consecutive full-line comments form one span. Nesting follows indentation.
#[derive(Debug, Clone, Copy)]
pub struct LineRun {
    name: &'static str,
    prefix: &'static str,
    /// String delimiters; strings may span lines.
    quotes: &'static [u8],
    /// `<<WORD` heredocs.
    heredocs: bool,
}

impl LineRun {
    /// Languages commenting with `#` (Ruby, shell, Perl, R, Elixir).
    pub const fn hash(name: &'static str) -> Self {
        Self {
            name,
            prefix: "#",
            quotes: b"\"'",
            heredocs: false,
        }
    }

    /// Data formats commenting with `#` (YAML, TOML), where apostrophes in
    /// plain values are not string delimiters.
    pub const fn data(name: &'static str) -> Self {
        Self {
            name,
            prefix: "#",
            quotes: b"",
            heredocs: false,
        }
    }

    /// Languages commenting with `--` (Lua, SQL, Haskell).
    ///
    /// Strings are not lexed: Haskell's `'"'` would open one.
    pub const fn dash(name: &'static str) -> Self {
        Self {
            name,
            prefix: "--",
            quotes: b"",
            heredocs: false,
        }
    }

    /// Also skip `<<WORD`, `<<-WORD` and `<<~WORD` heredoc bodies.
    #[must_use]
    pub const fn with_heredocs(mut self) -> Self {
        self.heredocs = true;
        self
    }
}

impl CommentConvention for LineRun {
    fn name(&self) -> &'static str {
        self.name
    }

    fn spans<'a>(&'a self, text: &'a str) -> Spans<'a> {
        Box::new(Scanner {
            style: self,
            text,
            pos: 0,
            scopes: Vec::new(),
            literal: None,
        })
    }
}

/// Multi-line literal the scanner is inside of.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Literal {
    Quote(u8),
    TripleQuote(u8),
    Heredoc {
        terminator: String,
        /// `<<-` and `<<~` allow an indented terminator.
        indented: bool,
    },
}

struct Scanner<'a> {
    style: &'a LineRun,
    text: &'a str,
    pos: usize,
    /// Indentation of each open declaration.
    scopes: Vec<usize>,
    literal: Option<Literal>,
}

impl Scanner<'_> {
    /// Number of open declarations enclosing a line at `indent`.
    fn depth_at(&self, indent: usize) -> usize {
        self.scopes.iter().filter(|&&open| open < indent).count()
    }

    fn is_comment(&self, line_start: usize, content: &str) -> bool {
        // Shebang
        if line_start == 0 && content.starts_with("#!") {
            return false;
        }
        content.starts_with(self.style.prefix)
    }

    /// Consume a line that starts inside a literal.
    ///
    /// Returns `false` when the line starts as code.
    fn continue_literal(&mut self, line: &str) -> bool {
        match self.literal.take() {
            None => false,
            Some(Literal::Heredoc {
                terminator,
                indented,
            }) => {
                let candidate = if indented { line.trim() } else { line };
                if candidate != terminator {
                    self.literal = Some(Literal::Heredoc {
                        terminator,
                        indented,
                    });
                }
                true
            }
            Some(Literal::TripleQuote(quote)) => {
                let closing = [quote; 3];
                match line.as_bytes().windows(3).position(|w| w == closing) {
                    Some(idx) => self.lex_code(&line[idx + 3..]),
                    None => self.literal = Some(Literal::TripleQuote(quote)),
                }
                true
            }
            Some(Literal::Quote(quote)) => {
                match closing_quote(line.as_bytes(), 0, quote) {
                    Some(after) => self.lex_code(&line[after..]),
                    None => self.literal = Some(Literal::Quote(quote)),
                }
                true
            }
        }
    }

    /// Lex one line of code up to a trailing comment, recording any literal
    /// left open at its end.
    fn lex_code(&mut self, code: &str) {
        let bytes = code.as_bytes();
        let prefix = self.style.prefix.as_bytes();
        let mut heredoc = None;
        let mut i = 0;
        while i < bytes.len() {
            let byte = bytes[i];
            if bytes[i..].starts_with(prefix) && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
                break;
            }
            if byte == b'\\' {
                i += 2;
            } else if self.style.quotes.contains(&byte) {
                if bytes[i..].starts_with(&[byte; 3]) {
                    let closing = [byte; 3];
                    match bytes[i + 3..].windows(3).position(|w| w == closing) {
                        Some(idx) => i += 3 + idx + 3,
                        None => {
                            self.literal = Some(Literal::TripleQuote(byte));
                            return;
                        }
                    }
                } else {
                    match closing_quote(bytes, i + 1, byte) {
                        Some(after) => i = after,
                        None => {
                            self.literal = Some(Literal::Quote(byte));
                            return;
                        }
                    }
                }
            } else if self.style.heredocs && bytes[i..].starts_with(b"<<") {
                match parse_heredoc(&code[i + 2..]) {
                    Some((literal, len)) => {
                        heredoc = heredoc.or(Some(literal));
                        i += 2 + len;
                    }
                    None => i += 2,
                }
            } else {
                i += 1;
            }
        }
        self.literal = heredoc;
    }
}

/// Index just past the `quote` closing a string whose body starts at `from`.
fn closing_quote(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Heredoc introduced by the text after `<<`, and the bytes it spans.
///
/// `<< WORD` with a space is only accepted for quoted or upper-case words,
/// so `list << item` stays an operator.
fn parse_heredoc(after: &str) -> Option<(Literal, usize)> {
    let spaces = after.len() - after.trim_start_matches([' ', '\t']).len();
    let mut rest = &after[spaces..];
    let indented = rest.starts_with(['-', '~']);
    if indented {
        rest = &rest[1..];
    }
    let flag_len = usize::from(indented);

    let (word, quoted, word_len) = match rest.as_bytes().first() {
        Some(&quote @ (b'"' | b'\'')) => {
            let close = rest[1..].find(char::from(quote))?;
            (&rest[1..=close], true, close + 2)
        }
        _ => {
            let len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            (&rest[..len], false, len)
        }
    };
    let word_ok = !word.is_empty() && !word.as_bytes()[0].is_ascii_digit();
    let spaced_ok = spaces == 0
        || quoted
        || word
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
    if !word_ok || !spaced_ok {
        return None;
    }

    let literal = Literal::Heredoc {
        terminator: word.to_owned(),
        indented,
    };
    Some((literal, spaces + flag_len + word_len))
}

impl Iterator for Scanner<'_> {
    type Item = DocCommentSpan;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let line_start = self.pos;
            let (line_end, next) = line_bounds(self.text, line_start);
            let line = &self.text[line_start..line_end];
            let (indent, content) = indent_columns(line);
            self.pos = next;

            if self.continue_literal(line) || content.trim().is_empty() {
                continue;
            }
            if !self.is_comment(line_start, content) {
                self.lex_code(line);
                while self.scopes.last().is_some_and(|&open| open >= indent) {
                    self.scopes.pop();
                }
                if declaration::parse_line_run(line).is_some() {
                    self.scopes.push(indent);
                }
                continue;
            }

            let start = line_end - content.len();
            let mut end = line_end;
            while self.pos < self.text.len() {
                let (run_end, run_next) = line_bounds(self.text, self.pos);
                if !self.text[self.pos..run_end]
                    .trim_start()
                    .starts_with(self.style.prefix)
                {
                    break;
                }
                end = run_end;
                self.pos = run_next;
            }

            let leader = Leader::Prefix(self.style.prefix);
            if leader.strip_lines(&self.text[start..end]).trim().is_empty() {
                continue;
            }

            let mut span =
                DocCommentSpan::floating(start, end, self.depth_at(indent)).with_leader(leader);
            let (decl_end, _) = line_bounds(self.text, self.pos);
            let decl_line = &self.text[self.pos..decl_end];
            if let Some(decl) = declaration::parse_line_run(decl_line) {
                let (decl_indent, _) = indent_columns(decl_line);
                span = span.attached(decl.kind, decl.name, self.depth_at(decl_indent));
            }
            return Some(span);
        }
        None
    }
}
