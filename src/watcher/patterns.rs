//! Default include/exclude patterns.
//!
//! The watcher core never guesses patterns itself; callers that leave
//! patterns unspecified ask a [`PatternProvider`] for them.

use std::collections::BTreeSet;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

/// Source file extensions recognised when inferring include patterns.
const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "ts", "jsx", "tsx", "mjs", "go", "java", "c", "cpp", "cc", "h", "hpp",
    "cs", "rb", "php", "swift", "kt", "scala", "sh", "bash", "zsh", "sql", "lua", "pl", "r",
    "jl", "ex", "exs", "erl", "hs", "ml", "yaml", "yml", "json", "toml", "ini", "cfg", "conf",
    "env", "html", "css", "scss", "vue", "svelte",
];

/// Directories and files that never trigger a restart by default.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    ".venv",
    "venv",
    "env",
    "node_modules",
    "target",
    "build",
    "dist",
    ".idea",
    ".vscode",
    "*.pyc",
    "*.swp",
    "*~",
    ".#*",
];

/// How deep [`ProjectPatterns`] looks for source files.
const SCAN_DEPTH: usize = 3;

/// Supplies patterns for whichever side the caller left unspecified.
pub trait PatternProvider {
    /// Include globs for a project rooted at `root`.
    fn include_patterns(&self, root: &Path) -> Vec<String>;

    /// Exclude globs for a project rooted at `root`.
    fn exclude_patterns(&self, root: &Path) -> Vec<String>;
}

/// Infers include globs from the extensions present in the project.
///
/// Falls back to `*` when no known source file is found, so a project of
/// unusual files still restarts on every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectPatterns;

impl PatternProvider for ProjectPatterns {
    fn include_patterns(&self, root: &Path) -> Vec<String> {
        let mut extensions = BTreeSet::new();

        let walker = WalkDir::new(root)
            .max_depth(SCAN_DEPTH)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_default_excluded_dir(entry));

        for entry in walker.filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(ext) = source_extension(entry.path()) {
                extensions.insert(ext);
            }
        }

        if extensions.is_empty() {
            tracing::debug!(root = %root.display(), "No source files found, watching everything");
            return vec!["*".to_string()];
        }

        let patterns: Vec<String> = extensions.into_iter().map(|ext| format!("*.{ext}")).collect();
        tracing::debug!(root = %root.display(), ?patterns, "Inferred include patterns");
        patterns
    }

    fn exclude_patterns(&self, _root: &Path) -> Vec<String> {
        DEFAULT_EXCLUDES.iter().map(ToString::to_string).collect()
    }
}

/// Lowercased extension of `path` if it is a known source extension.
fn source_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    SOURCE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn is_default_excluded_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| DEFAULT_EXCLUDES.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_source_extension() {
        assert_eq!(source_extension(Path::new("app.py")), Some("py".to_string()));
        assert_eq!(source_extension(Path::new("Main.RS")), Some("rs".to_string()));
        assert_eq!(source_extension(Path::new("image.png")), None);
        assert_eq!(source_extension(Path::new("Makefile")), None);
    }

    #[test]
    fn test_infers_extensions_present() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.py"), "print(1)").unwrap();
        fs::create_dir_all(tmp.path().join("conf")).unwrap();
        fs::write(tmp.path().join("conf/settings.yaml"), "a: 1").unwrap();
        fs::write(tmp.path().join("logo.png"), [0u8; 8]).unwrap();

        let patterns = ProjectPatterns.include_patterns(tmp.path());

        assert_eq!(patterns, vec!["*.py".to_string(), "*.yaml".to_string()]);
    }

    #[test]
    fn test_skips_noise_directories() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.go"), "package main").unwrap();
        fs::create_dir_all(tmp.path().join("node_modules/pkg")).unwrap();
        fs::write(tmp.path().join("node_modules/pkg/index.js"), "").unwrap();

        let patterns = ProjectPatterns.include_patterns(tmp.path());

        assert_eq!(patterns, vec!["*.go".to_string()]);
    }

    #[test]
    fn test_falls_back_to_everything() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "hi").unwrap();

        assert_eq!(ProjectPatterns.include_patterns(tmp.path()), vec!["*"]);
    }

    #[test]
    fn test_default_excludes() {
        let excludes = ProjectPatterns.exclude_patterns(Path::new("/any"));

        assert!(excludes.iter().any(|p| p == ".git"));
        assert!(excludes.iter().any(|p| p == "__pycache__"));
        assert!(excludes.iter().any(|p| p == ".venv"));
    }
}
