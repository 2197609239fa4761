//! Source file discovery.

use std::fs;
use std::path::{Component, Path, PathBuf};

use docgram_core::ConventionRegistry;
use glob::Pattern;

use crate::error::CliError;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "__pycache__"];

/// A file selected for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceFile {
    pub path: PathBuf,
    /// Forward-slash path used as the document URI.
    pub uri: String,
    /// Language id handed to the indexer (the lowercased extension).
    pub language: String,
}

/// Finds indexable files under a set of roots.
pub(crate) struct Walker<'a> {
    registry: &'a ConventionRegistry,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        registry: &'a ConventionRegistry,
        include: &[String],
        exclude: &[String],
    ) -> Result<Self, CliError> {
        Ok(Self {
            registry,
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Collect files under `roots`, sorted by URI.
    ///
    /// A root that is a file is taken as is, whatever its extension.
    pub(crate) fn collect(&self, roots: &[PathBuf]) -> Result<Vec<SourceFile>, CliError> {
        let mut files = Vec::new();
        for root in roots {
            if root.is_file() {
                files.push(source_file(root.clone(), uri_for(root)));
            } else if root.is_dir() {
                self.walk_dir(root, root, &mut files);
            } else {
                return Err(CliError::Validation(format!(
                    "path not found: {}",
                    root.display()
                )));
            }
        }
        files.sort_by(|a, b| a.uri.cmp(&b.uri));
        files.dedup_by(|a, b| a.uri == b.uri);
        Ok(files)
    }

    fn walk_dir(&self, root: &Path, dir: &Path, files: &mut Vec<SourceFile>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(error = %e, dir = %dir.display(), "Skipping unreadable directory");
                return;
            }
        };

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

            if is_dir {
                if !SKIPPED_DIRS.iter().any(|skipped| *skipped == name) {
                    self.walk_dir(root, &path, files);
                }
                continue;
            }

            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let relative = slash_path(relative);
            if self.selects(&path, &relative) {
                files.push(source_file(path.clone(), uri_for(&path)));
            }
        }
    }

    fn selects(&self, path: &Path, relative: &str) -> bool {
        let included = if self.include.is_empty() {
            self.registry.contains(&language_of(path))
        } else {
            self.include.iter().any(|p| p.matches(relative))
        };
        included && !self.exclude.iter().any(|p| p.matches(relative))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, CliError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| CliError::Validation(format!("invalid pattern '{p}': {e}")))
        })
        .collect()
}

fn source_file(path: PathBuf, uri: String) -> SourceFile {
    let language = language_of(&path);
    SourceFile {
        path,
        uri,
        language,
    }
}

fn language_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// URI for a path as the user gave it, without a leading `./`.
fn uri_for(path: &Path) -> String {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    slash_path(&normalized)
}

fn slash_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relative_uris(root: &Path, files: &[SourceFile]) -> Vec<String> {
        let prefix = format!("{}/", slash_path(root));
        files
            .iter()
            .map(|f| f.uri.strip_prefix(&prefix).unwrap_or(&f.uri).to_owned())
            .collect()
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            "src/main.rs",
            "src/lib/util.py",
            "README.md",
            "notes.txt",
            ".git/config.py",
            ".hidden.py",
            "node_modules/pkg/index.js",
            "target/debug/build.rs",
            "pkg/__pycache__/mod.py",
            "web/app.TS",
        ] {
            touch(dir.path(), file);
        }
        dir
    }

    #[test]
    fn test_collect_known_extensions() {
        let dir = tree();
        let registry = ConventionRegistry::builtin();
        let walker = Walker::new(&registry, &[], &[]).unwrap();

        let files = walker.collect(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(
            relative_uris(dir.path(), &files),
            vec!["src/lib/util.py", "src/main.rs", "web/app.TS"]
        );
        assert_eq!(files[2].language, "ts");
    }

    #[test]
    fn test_include_and_exclude() {
        let dir = tree();
        let registry = ConventionRegistry::builtin();
        let walker = Walker::new(
            &registry,
            &["**/*.txt".to_owned(), "src/**".to_owned()],
            &["src/lib/**".to_owned()],
        )
        .unwrap();

        let files = walker.collect(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(
            relative_uris(dir.path(), &files),
            vec!["notes.txt", "src/main.rs"]
        );
    }

    #[test]
    fn test_file_root_taken_as_is() {
        let dir = tree();
        let registry = ConventionRegistry::builtin();
        let walker = Walker::new(&registry, &[], &[]).unwrap();

        let files = walker.collect(&[dir.path().join("notes.txt")]).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].language, "txt");
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ConventionRegistry::builtin();
        let walker = Walker::new(&registry, &[], &[]).unwrap();

        let err = walker.collect(&[dir.path().join("missing")]).unwrap_err();

        assert!(err.to_string().contains("path not found"));
    }

    #[test]
    fn test_invalid_pattern() {
        let registry = ConventionRegistry::builtin();
        assert!(Walker::new(&registry, &["src/[a".to_owned()], &[]).is_err());
    }

    #[test]
    fn test_uri_strips_current_dir() {
        assert_eq!(uri_for(Path::new("./src/main.rs")), "src/main.rs");
        assert_eq!(uri_for(Path::new("src/./lib.rs")), "src/lib.rs");
    }
}
