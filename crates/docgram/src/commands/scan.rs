//! `docgram scan` command implementation.

use std::io::Write;

use clap::Args;
use docgram_core::{DiagramRecord, ExtractionStats, Snapshot};

use super::{IndexRun, SourceArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the scan command.
#[derive(Args)]
pub(crate) struct ScanArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the inventory to stdout as JSON snapshots.
    #[arg(long)]
    json: bool,
}

impl ScanArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let run = self.source.index()?;

        for err in &run.failed {
            output.warning(&format!("Skipped {err}"));
        }

        if self.json {
            let snapshots = snapshots(&run);
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &snapshots)?;
            writeln!(stdout)?;
        } else {
            print_inventory(&output, &run);
        }

        output.success(&format!(
            "Found {} diagrams in {} files ({:.1} ms)",
            run.diagram_count(),
            run.files.len(),
            run.elapsed_ms
        ));
        if let Some(summary) = malformed_summary(&run.stats) {
            output.warning(&summary);
        }
        Ok(())
    }
}

/// Snapshots for every file, including files without diagrams.
pub(crate) fn snapshots(run: &IndexRun) -> Vec<Snapshot> {
    run.files
        .iter()
        .map(|f| Snapshot::new(f.file.uri.clone(), f.outcome.records.clone()))
        .collect()
}

fn print_inventory(output: &Output, run: &IndexRun) {
    for indexed in run.files.iter().filter(|f| !f.outcome.records.is_empty()) {
        output.highlight(&indexed.file.uri);
        for record in &indexed.outcome.records {
            output.info(&inventory_line(&indexed.text, record));
        }
    }
}

fn inventory_line(text: &str, record: &DiagramRecord) -> String {
    format!(
        "  #{:<3} line {:<5} {:<10} {} (depth {})",
        record.ordinal,
        line_number(text, record.document_offset_start),
        record.language,
        record.label(),
        record.depth
    )
}

/// 1-based line containing byte `offset`.
fn line_number(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

fn malformed_summary(stats: &ExtractionStats) -> Option<String> {
    let parts: Vec<String> = [
        (stats.unterminated_fences, "unterminated fence"),
        (stats.unterminated_comments, "unterminated comment"),
        (stats.empty_fences, "empty diagram"),
        (stats.binary_documents, "binary file"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, what)| {
        if count == 1 {
            format!("1 {what}")
        } else {
            format!("{count} {what}s")
        }
    })
    .collect();

    (!parts.is_empty()).then(|| format!("Recovered: {}", parts.join(", ")))
}
