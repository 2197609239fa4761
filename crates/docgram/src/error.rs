//! CLI error types.

use std::path::PathBuf;

use docgram_config::ConfigError;
use docgram_core::UnknownLanguage;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("languages.aliases: {0}")]
    Language(#[from] UnknownLanguage),

    #[error("{0}")]
    Validation(String),
}
