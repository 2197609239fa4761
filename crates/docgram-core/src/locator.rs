//! Docstring locator.

use std::sync::LazyLock;

use crate::convention::{ConventionRegistry, Spans};

static BUILTIN: LazyLock<ConventionRegistry> = LazyLock::new(ConventionRegistry::builtin);

/// Locate documentation comments in `text` using the built-in conventions.
///
/// The sequence is lazy, ordered by `start`, and identical for identical
/// input. Unknown language ids use the generic block-comment convention.
///
/// # Example
///
/// ```
/// use docgram_core::{SymbolKind, locate};
///
/// let text = "class Graph:\n    \"\"\"Nodes and edges.\"\"\"\n";
/// let span = locate(text, "python").next().unwrap();
///
/// assert_eq!(span.text(text), "Nodes and edges.");
/// assert_eq!(span.symbol_kind, SymbolKind::Class);
/// ```
#[must_use]
pub fn locate<'a>(text: &'a str, language_id: &str) -> Spans<'a> {
    BUILTIN.resolve(language_id).spans(text)
}
