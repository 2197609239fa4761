//! CLI command implementations.

pub(crate) mod diff;
pub(crate) mod extract;
pub(crate) mod scan;

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use docgram_config::{CliSettings, Config};
use docgram_core::{DiagramIndexer, ExtractionStats, IndexOutcome, SourceDocument};
use rayon::prelude::*;

use crate::error::CliError;
use crate::walk::{SourceFile, Walker};

pub(crate) use diff::DiffArgs;
pub(crate) use extract::ExtractArgs;
pub(crate) use scan::ScanArgs;

/// Arguments shared by commands that index source files.
#[derive(Args)]
pub(crate) struct SourceArgs {
    /// Files or directories to index (default: current directory).
    paths: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover docgram.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Diagram fence keyword (repeatable, overrides config).
    #[arg(short = 'k', long = "keyword")]
    keywords: Vec<String>,

    /// Glob of files to index (repeatable, overrides config).
    #[arg(long)]
    include: Vec<String>,

    /// Glob of files to skip (repeatable, overrides config).
    #[arg(long)]
    exclude: Vec<String>,
}

/// One indexed file.
pub(crate) struct IndexedFile {
    pub file: SourceFile,
    pub text: String,
    pub outcome: IndexOutcome,
}

/// Result of indexing every selected file.
pub(crate) struct IndexRun {
    pub files: Vec<IndexedFile>,
    /// Files that could not be read.
    pub failed: Vec<CliError>,
    pub stats: ExtractionStats,
    pub elapsed_ms: f64,
}

impl IndexRun {
    pub(crate) fn diagram_count(&self) -> usize {
        self.files.iter().map(|f| f.outcome.records.len()).sum()
    }
}

impl SourceArgs {
    /// Load configuration, select files and index them in parallel.
    pub(crate) fn index(self) -> Result<IndexRun, CliError> {
        let cli_settings = CliSettings {
            keywords: non_empty(self.keywords),
            include: non_empty(self.include),
            exclude: non_empty(self.exclude),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let indexer = DiagramIndexer::new()
            .with_keywords(&config.diagrams.keywords)
            .with_language_aliases(&config.languages.aliases)?;

        let roots = if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths
        };
        let walker = Walker::new(indexer.registry(), &config.scan.include, &config.scan.exclude)?;
        let selected = walker.collect(&roots)?;

        let start = Instant::now();
        let results: Vec<Result<IndexedFile, CliError>> = selected
            .into_par_iter()
            .map(|file| index_file(&indexer, file))
            .collect();

        let mut run = IndexRun {
            files: Vec::with_capacity(results.len()),
            failed: Vec::new(),
            stats: ExtractionStats::default(),
            elapsed_ms: 0.0,
        };
        for result in results {
            match result {
                Ok(indexed) => {
                    run.stats += indexed.outcome.stats;
                    run.files.push(indexed);
                }
                Err(e) => run.failed.push(e),
            }
        }
        run.elapsed_ms = elapsed_ms(start);

        tracing::info!(
            files = run.files.len(),
            diagrams = run.diagram_count(),
            failed = run.failed.len(),
            elapsed_ms = run.elapsed_ms,
            "Indexed files"
        );
        Ok(run)
    }
}

fn index_file(indexer: &DiagramIndexer, file: SourceFile) -> Result<IndexedFile, CliError> {
    let text = std::fs::read_to_string(&file.path).map_err(|source| CliError::File {
        path: file.path.clone(),
        source,
    })?;
    let doc = SourceDocument::new(&text, &file.language).with_uri(&file.uri);
    let outcome = indexer.index(&doc);
    Ok(IndexedFile {
        file,
        text,
        outcome,
    })
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
