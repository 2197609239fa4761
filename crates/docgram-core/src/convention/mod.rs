//! Per-language documentation comment conventions.
//!
//! Each convention turns source text into a lazy sequence of
//! [`DocCommentSpan`]s. Conventions are looked up by language identifier in
//! a [`ConventionRegistry`]; unknown identifiers fall back to the generic
//! block-comment convention.

mod c_style;
mod declaration;
mod line_run;
mod python;

use std::collections::HashMap;
use std::sync::Arc;

pub use c_style::CStyle;
pub use line_run::LineRun;
pub use python::TripleQuoted;

use crate::span::DocCommentSpan;

/// Lazy span sequence produced by a convention.
pub type Spans<'a> = Box<dyn Iterator<Item = DocCommentSpan> + 'a>;

/// A language family's documentation comment syntax.
///
/// Implementations must yield spans ordered by `start`, non-overlapping,
/// with `start < end`, and must produce identical sequences for identical
/// input.
pub trait CommentConvention: Send + Sync {
    /// Convention name, used in logs.
    fn name(&self) -> &'static str;

    /// Scan `text` for documentation comments.
    fn spans<'a>(&'a self, text: &'a str) -> Spans<'a>;
}

/// Alias target is not a registered language.
#[derive(Debug, thiserror::Error)]
#[error("unknown language id '{0}'")]
pub struct UnknownLanguage(pub String);

/// Language identifier to convention lookup.
///
/// Identifiers are case-insensitive and may be given as file extensions,
/// with or without the leading dot.
#[derive(Clone)]
pub struct ConventionRegistry {
    conventions: HashMap<String, Arc<dyn CommentConvention>>,
    fallback: Arc<dyn CommentConvention>,
}

impl ConventionRegistry {
    /// Registry with no languages; everything resolves to the fallback.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            conventions: HashMap::new(),
            fallback: Arc::new(CStyle::generic()),
        }
    }

    /// Registry with the built-in languages and their file extensions.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register(&["python", "py", "pyi", "pyw"], TripleQuoted);

        registry.register(&["rust", "rs"], CStyle::rust());
        registry.register(&["javascript", "js", "mjs", "cjs"], CStyle::javascript("javascript"));
        registry.register(&["typescript", "ts", "mts", "cts"], CStyle::javascript("typescript"));
        registry.register(&["javascriptreact", "jsx"], CStyle::javascript("javascriptreact"));
        registry.register(&["typescriptreact", "tsx"], CStyle::javascript("typescriptreact"));
        registry.register(&["java"], CStyle::jvm("java"));
        registry.register(&["kotlin", "kt", "kts"], CStyle::jvm("kotlin"));
        registry.register(&["scala", "sc"], CStyle::jvm("scala"));
        registry.register(&["swift"], CStyle::swift());
        registry.register(&["c", "h"], CStyle::c("c"));
        registry.register(
            &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
            CStyle::c("cpp"),
        );
        registry.register(&["objective-c", "m"], CStyle::c("objective-c"));
        registry.register(&["csharp", "cs"], CStyle::csharp());
        registry.register(&["go"], CStyle::go());
        registry.register(&["php"], CStyle::php());
        registry.register(&["dart"], CStyle::dart());

        registry.register(&["ruby", "rb"], LineRun::hash("ruby").with_heredocs());
        registry.register(
            &["shellscript", "sh", "bash", "zsh"],
            LineRun::hash("shellscript").with_heredocs(),
        );
        registry.register(&["perl", "pl", "pm"], LineRun::hash("perl").with_heredocs());
        registry.register(&["r"], LineRun::hash("r"));
        registry.register(&["elixir", "ex", "exs"], LineRun::hash("elixir"));
        registry.register(&["yaml", "yml"], LineRun::data("yaml"));
        registry.register(&["toml"], LineRun::data("toml"));
        registry.register(&["lua"], LineRun::dash("lua"));
        registry.register(&["sql"], LineRun::dash("sql"));
        registry.register(&["haskell", "hs"], LineRun::dash("haskell"));

        registry
    }

    /// Register a convention under one or more identifiers.
    pub fn register<C>(&mut self, ids: &[&str], convention: C)
    where
        C: CommentConvention + 'static,
    {
        let convention: Arc<dyn CommentConvention> = Arc::new(convention);
        for id in ids {
            self.conventions
                .insert(normalize(id), Arc::clone(&convention));
        }
    }

    /// Make `alias` resolve to the convention registered for `target`.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), UnknownLanguage> {
        let convention = self
            .conventions
            .get(&normalize(target))
            .cloned()
            .ok_or_else(|| UnknownLanguage(target.to_owned()))?;
        self.conventions.insert(normalize(alias), convention);
        Ok(())
    }

    /// Whether `id` has a registered convention (the fallback does not count).
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.conventions.contains_key(&normalize(id))
    }

    /// Convention for `id`, or the generic fallback.
    #[must_use]
    pub fn resolve(&self, id: &str) -> &dyn CommentConvention {
        &**self
            .conventions
            .get(&normalize(id))
            .unwrap_or(&self.fallback)
    }
}

impl Default for ConventionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ConventionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.conventions.keys().collect();
        ids.sort();
        f.debug_struct("ConventionRegistry")
            .field("languages", &ids)
            .finish_non_exhaustive()
    }
}

fn normalize(id: &str) -> String {
    id.trim().trim_start_matches('.').to_lowercase()
}

/// Indentation width in columns (tabs advance to the next multiple of 8)
/// and the text after it.
pub(crate) fn indent_columns(line: &str) -> (usize, &str) {
    let mut width = 0;
    for (idx, ch) in line.char_indices() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 8 - width % 8,
            _ => return (width, &line[idx..]),
        }
    }
    (width, "")
}

/// End of the line containing `pos` (before `\r\n` or `\n`) and the start
/// of the next line.
pub(crate) fn line_bounds(text: &str, pos: usize) -> (usize, usize) {
    match text[pos..].find('\n') {
        Some(idx) => {
            let newline = pos + idx;
            let end = if newline > pos && text.as_bytes()[newline - 1] == b'\r' {
                newline - 1
            } else {
                newline
            };
            (end, newline + 1)
        }
        None => (text.len(), text.len()),
    }
}
