//! Diagram block extraction for source code documentation.
//!
//! Finds fenced diagram definitions (```` ```mermaid ```` and friends) inside
//! documentation comments and docstrings, and turns them into an ordered,
//! addressable inventory:
//! - [`locate`] finds documentation comments and the symbol each one documents
//! - [`extract_fences`] finds diagram fences inside one comment
//! - [`DiagramIndexer`] / [`build_index`] combine both into [`DiagramRecord`]s
//!   with document offsets and stable ids
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - `convention`: per-language comment syntax ([`TripleQuoted`], [`CStyle`],
//!   [`LineRun`]) behind the [`CommentConvention`] trait, looked up in a
//!   [`ConventionRegistry`]
//! - `fence`: line-based fence scanner
//! - `index`: record assembly, ordering, ids and [`ExtractionStats`]
//! - `snapshot`: [`diff_snapshots`] for comparing two indexing runs
//! - `render`: the [`DiagramRenderer`] interface consumed by renderers
//!
//! Every pass is a pure function of the document text, its language id and
//! the keyword set. Malformed input never fails a pass; recovered problems
//! are counted in [`ExtractionStats`].
//!
//! # Example
//!
//! ```
//! use docgram_core::{SourceDocument, SymbolKind, build_index};
//!
//! let text = r#"
//! class Pipeline:
//!     """
//!     ```mermaid
//!     graph LR
//!         fetch --> build --> deploy
//!     ```
//!     """
//! "#;
//!
//! let records = build_index(&SourceDocument::new(text, "python"));
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].symbol_kind, SymbolKind::Class);
//! assert_eq!(records[0].symbol_name.as_deref(), Some("Pipeline"));
//! ```

mod cancel;
mod convention;
mod document;
mod fence;
mod index;
mod keyword;
mod locator;
mod record;
mod render;
mod snapshot;
mod span;
mod stats;

pub use cancel::CancelFlag;
pub use convention::{
    CStyle, CommentConvention, ConventionRegistry, LineRun, Spans, TripleQuoted, UnknownLanguage,
};
pub use document::SourceDocument;
pub use fence::{DiagramBlock, FenceStats, Fences, extract_fences};
pub use index::{DiagramIndexer, IndexOutcome, build_index};
pub use keyword::{DEFAULT_KEYWORD, DiagramKeywords};
pub use locator::locate;
pub use record::DiagramRecord;
pub use render::{DiagramRenderer, RenderOutcome};
pub use snapshot::{Snapshot, SnapshotDiff, diff_snapshots};
pub use span::{DocCommentSpan, Leader, SymbolKind};
pub use stats::ExtractionStats;
