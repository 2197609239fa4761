//! Configuration for docgram.
//!
//! Settings come from `docgram.toml`, found in the current directory or one
//! of its parents, with command-line overrides applied on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override diagram keywords.
    pub keywords: Option<Vec<String>>,
    /// Override include globs.
    pub include: Option<Vec<String>>,
    /// Override exclude globs.
    pub exclude: Option<Vec<String>>,
}

/// Configuration filename.
const CONFIG_FILENAME: &str = "docgram.toml";

/// Keyword used when the config names none.
const DEFAULT_KEYWORD: &str = "mermaid";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram fence configuration.
    pub diagrams: DiagramsConfig,
    /// Extra language ids.
    pub languages: LanguagesConfig,
    /// File discovery configuration.
    pub scan: ScanConfig,
    /// Path to the loaded config file, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[diagrams]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Fence info-string keywords that mark a diagram.
    pub keywords: Vec<String>,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            keywords: vec![DEFAULT_KEYWORD.to_owned()],
        }
    }
}

/// `[languages]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Extra language id or extension mapped to a built-in language id.
    pub aliases: BTreeMap<String, String>,
}

/// `[scan]` section.
///
/// Patterns are matched against paths relative to the scanned directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files to index. Empty means every file with a known extension.
    pub include: Vec<String>,
    /// Files to skip, checked after `include`.
    pub exclude: Vec<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// Reads `config_path` when given, otherwise searches for `docgram.toml`
    /// in the current directory and its parents. Falls back to defaults when
    /// nothing is found. CLI settings win over file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(keywords) = &settings.keywords {
            self.diagrams.keywords.clone_from(keywords);
        }
        if let Some(include) = &settings.include {
            self.scan.include.clone_from(include);
        }
        if let Some(exclude) = &settings.exclude {
            self.scan.exclude.clone_from(exclude);
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Language alias targets are only checked for presence here; whether a
    /// target names a known language is up to the consumer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_diagrams()?;
        self.validate_languages()?;
        self.validate_scan()?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        if self.diagrams.keywords.is_empty() {
            return Err(ConfigError::Validation(
                "diagrams.keywords cannot be empty".to_owned(),
            ));
        }
        for keyword in &self.diagrams.keywords {
            require_non_empty(keyword, "diagrams.keywords")?;
            if keyword.chars().any(|c| c.is_whitespace() || c == '`') {
                return Err(ConfigError::Validation(format!(
                    "diagrams.keywords: '{keyword}' cannot contain whitespace or backticks"
                )));
            }
        }
        Ok(())
    }

    fn validate_languages(&self) -> Result<(), ConfigError> {
        for (alias, target) in &self.languages.aliases {
            require_non_empty(alias.trim(), "languages.aliases key")?;
            require_non_empty(target.trim(), &format!("languages.aliases.{alias}"))?;
        }
        Ok(())
    }

    fn validate_scan(&self) -> Result<(), ConfigError> {
        for (field, patterns) in [
            ("scan.include", &self.scan.include),
            ("scan.exclude", &self.scan.exclude),
        ] {
            for pattern in patterns {
                glob::Pattern::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!("{field}: invalid pattern '{pattern}': {e}"))
                })?;
            }
        }
        Ok(())
    }
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
