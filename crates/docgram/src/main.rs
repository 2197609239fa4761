//! docgram CLI - diagram extraction from documentation comments.
//!
//! Provides commands for:
//! - `scan`: List the diagrams found in source files
//! - `extract`: Write each diagram's source to its own file
//! - `diff`: Compare two snapshots written by `scan --json`

mod commands;
mod error;
mod output;
mod walk;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DiffArgs, ExtractArgs, ScanArgs};
use output::Output;

/// docgram - diagrams in documentation comments.
#[derive(Parser)]
#[command(name = "docgram", version, about)]
struct Cli {
    /// Enable verbose output (configuration and timing logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index source files and list their diagrams.
    Scan(ScanArgs),
    /// Write diagram sources to files.
    Extract(ExtractArgs),
    /// Compare two JSON snapshots.
    Diff(DiffArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Scan(args) => args.execute(),
        Commands::Extract(args) => args.execute(),
        Commands::Diff(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
