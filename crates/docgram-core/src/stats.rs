//! Counts of recovered malformed constructs.

use std::ops::AddAssign;

use crate::fence::FenceStats;

/// What an indexing pass skipped or repaired.
///
/// The core never reports these itself beyond `tracing` debug events;
/// callers decide whether to surface them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractionStats {
    /// Documentation comments scanned.
    pub spans_scanned: usize,
    /// Docstrings or block comments cut at end of input.
    pub unterminated_comments: usize,
    /// Diagram candidates with no closing marker.
    pub unterminated_fences: usize,
    /// Fences tagged with a non-diagram info string.
    pub skipped_fences: usize,
    /// Diagram fences with an empty or whitespace-only body.
    pub empty_fences: usize,
    /// Documents rejected as binary.
    pub binary_documents: usize,
}

impl ExtractionStats {
    /// Whether anything was skipped or repaired.
    #[must_use]
    pub fn has_malformed(&self) -> bool {
        self.unterminated_comments > 0 || self.unterminated_fences > 0 || self.empty_fences > 0
    }

    pub(crate) fn add_fences(&mut self, fences: FenceStats) {
        self.unterminated_fences += fences.unterminated;
        self.skipped_fences += fences.skipped;
        self.empty_fences += fences.empty;
    }
}

impl AddAssign for ExtractionStats {
    fn add_assign(&mut self, other: Self) {
        self.spans_scanned += other.spans_scanned;
        self.unterminated_comments += other.unterminated_comments;
        self.unterminated_fences += other.unterminated_fences;
        self.skipped_fences += other.skipped_fences;
        self.empty_fences += other.empty_fences;
        self.binary_documents += other.binary_documents;
    }
}
