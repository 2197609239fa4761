//! `docgram extract` command implementation.

use std::path::{Component, Path, PathBuf};

use clap::Args;
use docgram_core::DiagramRecord;

use super::SourceArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the extract command.
#[derive(Args)]
pub(crate) struct ExtractArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory to write diagram sources to.
    #[arg(short, long)]
    output_dir: PathBuf,
}

impl ExtractArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let run = self.source.index()?;

        for err in &run.failed {
            output.warning(&format!("Skipped {err}"));
        }

        let mut written = 0_usize;
        for indexed in &run.files {
            for record in &indexed.outcome.records {
                let path = output_path(&self.output_dir, &indexed.file.uri, record);
                write_source(&path, record)?;
                output.detail(&format!("  {}", path.display()));
                written += 1;
            }
        }

        output.success(&format!(
            "Wrote {written} diagrams to {}",
            self.output_dir.display()
        ));
        Ok(())
    }
}

fn write_source(path: &Path, record: &DiagramRecord) -> Result<(), CliError> {
    let to_file_error = |source| CliError::File {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(to_file_error)?;
    }
    let mut content = record.source.clone();
    content.push('\n');
    std::fs::write(path, content).map_err(to_file_error)
}

/// `DIR/<uri>.<ordinal>.<ext>`, keeping the target inside `dir`.
fn output_path(dir: &Path, uri: &str, record: &DiagramRecord) -> PathBuf {
    let mut path = dir.to_path_buf();
    for component in Path::new(uri).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(
        ".{}.{}",
        record.ordinal,
        file_extension(&record.language)
    ));
    path.set_file_name(name);
    path
}

/// Conventional file extension for a diagram keyword.
fn file_extension(language: &str) -> &str {
    match language {
        "mermaid" => "mmd",
        "plantuml" => "puml",
        "graphviz" | "dot" => "dot",
        other => other,
    }
}
