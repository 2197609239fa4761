//! Diagram inventory entries.

use sha2::{Digest, Sha256};

use crate::span::SymbolKind;

/// One diagram fence, resolved to document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagramRecord {
    /// Stable identifier derived from the document URI and ordinal.
    pub id: String,
    /// Byte offset of the first body byte.
    pub document_offset_start: usize,
    /// Byte offset one past the last body byte.
    pub document_offset_end: usize,
    /// Exact document text between the fence marker lines.
    pub body: String,
    /// Diagram source ready for rendering (`body` without comment leaders).
    pub source: String,
    /// Matched diagram keyword (`mermaid`, `plantuml`, ...).
    pub language: String,
    /// Kind of the documented symbol.
    pub symbol_kind: SymbolKind,
    /// Name of the documented symbol.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub symbol_name: Option<String>,
    /// Nesting depth of the documented symbol (or of the comment).
    pub depth: usize,
    /// 0-based rank of the record within its document.
    pub ordinal: usize,
}

impl DiagramRecord {
    /// Identifier for the `ordinal`-th diagram of a document.
    ///
    /// Format: `"{uri}#diagram-{ordinal}"`, or `"diagram-{ordinal}"` without a URI.
    #[must_use]
    pub fn make_id(uri: Option<&str>, ordinal: usize) -> String {
        match uri {
            Some(uri) if !uri.is_empty() => format!("{uri}#diagram-{ordinal}"),
            _ => format!("diagram-{ordinal}"),
        }
    }

    /// Compute a content hash for this diagram.
    ///
    /// Changes whenever the language or the render-ready source changes;
    /// offsets and symbol attribution do not participate.
    ///
    /// # Hash Format
    ///
    /// SHA-256 of `"{language}:{source}"`.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let content = format!("{}:{}", self.language, self.source);
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Short human-readable origin: `class Parser`, `function run`, or `module`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.symbol_name {
            Some(name) => format!("{} {name}", self.symbol_kind.as_str()),
            None => "module".to_owned(),
        }
    }
}
