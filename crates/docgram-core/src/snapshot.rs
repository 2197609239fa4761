//! Index snapshots and change detection between two of them.
//!
//! Records are matched by `id`. Because ids are positional, inserting a
//! diagram shifts the ids of the diagrams after it; those show up as
//! `changed` when their content differs from the diagram that previously
//! held the id.

use std::collections::BTreeMap;

use crate::record::DiagramRecord;

/// Index of one document at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Document identifier the ids were derived from.
    pub uri: String,
    pub records: Vec<DiagramRecord>,
}

impl Snapshot {
    #[must_use]
    pub fn new(uri: impl Into<String>, records: Vec<DiagramRecord>) -> Self {
        Self {
            uri: uri.into(),
            records,
        }
    }
}

/// Ids grouped by what happened to them between two snapshots.
///
/// Every list is sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Same id, different content or attribution.
    pub changed: Vec<String>,
    pub unchanged: Vec<String>,
}

impl SnapshotDiff {
    /// Whether the two snapshots hold the same diagrams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compare two sets of snapshots (any number of documents each).
#[must_use]
pub fn diff_snapshots(old: &[Snapshot], new: &[Snapshot]) -> SnapshotDiff {
    let old = by_id(old);
    let new = by_id(new);
    let mut diff = SnapshotDiff::default();

    for (id, record) in &new {
        match old.get(id) {
            None => diff.added.push((*id).to_owned()),
            Some(previous) if same_diagram(previous, record) => {
                diff.unchanged.push((*id).to_owned());
            }
            Some(_) => diff.changed.push((*id).to_owned()),
        }
    }
    diff.removed = old
        .keys()
        .filter(|id| !new.contains_key(*id))
        .map(|id| (*id).to_owned())
        .collect();

    diff
}

fn by_id(snapshots: &[Snapshot]) -> BTreeMap<&str, &DiagramRecord> {
    snapshots
        .iter()
        .flat_map(|snapshot| &snapshot.records)
        .map(|record| (record.id.as_str(), record))
        .collect()
}

fn same_diagram(a: &DiagramRecord, b: &DiagramRecord) -> bool {
    a.content_hash() == b.content_hash()
        && a.symbol_kind == b.symbol_kind
        && a.symbol_name == b.symbol_name
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{SourceDocument, build_index};

    fn snapshot(text: &str) -> Snapshot {
        let records = build_index(&SourceDocument::new(text, "python").with_uri("flow.py"));
        Snapshot::new("flow.py", records)
    }

    const BEFORE: &str = r#"def a():
    """
    ```mermaid
    graph TD
        A --> B
    ```
    """


def b():
    """
    ```mermaid
    graph LR
        X --> Y
    ```
    """
"#;

    #[test]
    fn test_identical_snapshots() {
        let diff = diff_snapshots(&[snapshot(BEFORE)], &[snapshot(BEFORE)]);

        assert!(diff.is_empty());
        assert_eq!(diff.unchanged, vec!["flow.py#diagram-0", "flow.py#diagram-1"]);
    }

    #[test]
    fn test_unrelated_edit_keeps_ids() {
        let after = format!("import os\n\n{BEFORE}\n\nx = 1\n");
        let diff = diff_snapshots(&[snapshot(BEFORE)], &[snapshot(&after)]);

        assert!(diff.is_empty());
    }

    #[test]
    fn test_edited_and_removed_diagrams() {
        let edited = BEFORE.replace("A --> B", "A --> C");
        let truncated: String = edited.lines().take(7).collect::<Vec<_>>().join("\n");
        let diff = diff_snapshots(&[snapshot(BEFORE)], &[snapshot(&truncated)]);

        assert_eq!(
            diff,
            SnapshotDiff {
                added: vec![],
                removed: vec!["flow.py#diagram-1".to_owned()],
                changed: vec!["flow.py#diagram-0".to_owned()],
                unchanged: vec![],
            }
        );
    }

    #[test]
    fn test_new_document() {
        let diff = diff_snapshots(&[], &[snapshot(BEFORE)]);
        assert_eq!(diff.added.len(), 2);
        assert!(diff.removed.is_empty());
    }
}
