//! `docgram diff` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use docgram_core::{Snapshot, diff_snapshots};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the diff command.
#[derive(Args)]
pub(crate) struct DiffArgs {
    /// Snapshot file written by `docgram scan --json` before the change.
    old: PathBuf,

    /// Snapshot file written after the change.
    new: PathBuf,
}

impl DiffArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let old = read_snapshots(&self.old)?;
        let new = read_snapshots(&self.new)?;

        let diff = diff_snapshots(&old, &new);
        for id in &diff.added {
            output.success(&format!("+ {id}"));
        }
        for id in &diff.removed {
            output.error(&format!("- {id}"));
        }
        for id in &diff.changed {
            output.warning(&format!("~ {id}"));
        }

        if diff.is_empty() {
            output.info(&format!("No changes ({} diagrams)", diff.unchanged.len()));
        } else {
            output.info(&format!(
                "{} added, {} removed, {} changed, {} unchanged",
                diff.added.len(),
                diff.removed.len(),
                diff.changed.len(),
                diff.unchanged.len()
            ));
        }
        Ok(())
    }
}

fn read_snapshots(path: &Path) -> Result<Vec<Snapshot>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| {
        CliError::Validation(format!("{}: not a snapshot file: {e}", path.display()))
    })
}
