//! Diagram index builder.
//!
//! Drives the locator over a document, runs the fence extractor on every
//! documentation comment, and resolves the resulting blocks into an ordered
//! inventory of [`DiagramRecord`]s.

use std::sync::LazyLock;

use crate::cancel::CancelFlag;
use crate::convention::{ConventionRegistry, UnknownLanguage};
use crate::document::SourceDocument;
use crate::fence::extract_fences;
use crate::keyword::DiagramKeywords;
use crate::record::DiagramRecord;
use crate::stats::ExtractionStats;

/// Result of indexing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOutcome {
    /// Records sorted by `document_offset_start`, ordinals dense from 0.
    pub records: Vec<DiagramRecord>,
    pub stats: ExtractionStats,
    /// The pass stopped early; `records` holds what was found before that.
    pub cancelled: bool,
}

/// Configurable index builder.
///
/// Holds no per-document state, so one indexer can serve any number of
/// documents from any number of threads.
///
/// # Example
///
/// ```
/// use docgram_core::{DiagramIndexer, SourceDocument, SymbolKind};
///
/// let text = "def flow():\n    \"\"\"\n    ```mermaid\n    graph TD\n        A --> B\n    ```\n    \"\"\"\n";
/// let doc = SourceDocument::new(text, "python").with_uri("flow.py");
/// let outcome = DiagramIndexer::new().index(&doc);
///
/// let record = &outcome.records[0];
/// assert_eq!(record.id, "flow.py#diagram-0");
/// assert_eq!(record.symbol_kind, SymbolKind::Function);
/// assert_eq!(&text[record.document_offset_start..record.document_offset_end], record.body);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiagramIndexer {
    registry: ConventionRegistry,
    keywords: DiagramKeywords,
}

impl DiagramIndexer {
    /// Indexer with the built-in languages and the `mermaid` keyword.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the diagram keyword set.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = DiagramKeywords::new(keywords);
        self
    }

    /// Map extra language ids or extensions onto registered conventions.
    pub fn with_language_aliases<I, A, T>(mut self, aliases: I) -> Result<Self, UnknownLanguage>
    where
        I: IntoIterator<Item = (A, T)>,
        A: AsRef<str>,
        T: AsRef<str>,
    {
        for (alias, target) in aliases {
            self.registry.alias(alias.as_ref(), target.as_ref())?;
        }
        Ok(self)
    }

    /// Replace the convention registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ConventionRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &ConventionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn keywords(&self) -> &DiagramKeywords {
        &self.keywords
    }

    /// Index one document.
    #[must_use]
    pub fn index(&self, doc: &SourceDocument<'_>) -> IndexOutcome {
        self.run(doc, None)
    }

    /// Index one document, stopping between comments once `cancel` is set.
    #[must_use]
    pub fn index_with_cancel(&self, doc: &SourceDocument<'_>, cancel: &CancelFlag) -> IndexOutcome {
        self.run(doc, Some(cancel))
    }

    fn run(&self, doc: &SourceDocument<'_>, cancel: Option<&CancelFlag>) -> IndexOutcome {
        let uri = doc.uri.unwrap_or_default();
        let mut outcome = IndexOutcome::default();

        if doc.looks_binary() {
            tracing::debug!(uri, "Skipping binary document");
            outcome.stats.binary_documents = 1;
            return outcome;
        }

        let convention = self.registry.resolve(doc.language_id);
        let mut spans = convention.spans(doc.text);
        loop {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                outcome.cancelled = true;
                break;
            }
            let Some(span) = spans.next() else {
                break;
            };

            outcome.stats.spans_scanned += 1;
            if !span.terminated {
                outcome.stats.unterminated_comments += 1;
                tracing::debug!(uri, offset = span.start, "Unterminated documentation comment");
            }

            let mut fences = extract_fences(span.text(doc.text), span.leader, &self.keywords);
            for block in fences.by_ref() {
                outcome.records.push(DiagramRecord {
                    id: String::new(),
                    document_offset_start: span.start + block.local_start,
                    document_offset_end: span.start + block.local_end,
                    source: span.leader.strip_lines(&block.body).into_owned(),
                    body: block.body,
                    language: block.info_string,
                    symbol_kind: span.symbol_kind,
                    symbol_name: span.symbol_name.clone(),
                    depth: span.depth,
                    ordinal: 0,
                });
            }
            outcome.stats.add_fences(fences.stats());
        }

        // Stable: records from one comment keep their extraction order
        outcome
            .records
            .sort_by_key(|record| record.document_offset_start);
        for (ordinal, record) in outcome.records.iter_mut().enumerate() {
            record.ordinal = ordinal;
            record.id = DiagramRecord::make_id(doc.uri, ordinal);
        }

        tracing::debug!(
            uri,
            convention = convention.name(),
            spans = outcome.stats.spans_scanned,
            records = outcome.records.len(),
            cancelled = outcome.cancelled,
            "Indexed document"
        );
        outcome
    }
}

static DEFAULT_INDEXER: LazyLock<DiagramIndexer> = LazyLock::new(DiagramIndexer::new);

/// Index a document with the default configuration.
///
/// Same records as `DiagramIndexer::new().index(doc).records`.
#[must_use]
pub fn build_index(doc: &SourceDocument<'_>) -> Vec<DiagramRecord> {
    DEFAULT_INDEXER.index(doc).records
}
