//! File discovery.
//!
//! Walks a root directory depth-first, pruning denylisted and dot-prefixed
//! directories, and keeps regular files whose extension maps to a
//! recognized language. Drives an `ignore::WalkBuilder` over a
//! canonicalized root and returns absolute paths, but the filtering
//! policy is an explicit denylist rather than gitignore-driven glob
//! matching — `.gitignore` is never consulted.

use crate::config::AnalysisConfig;
use crate::error::CoreError;
use crate::model::{FileDescriptor, Language};
use ignore::WalkBuilder;
use std::path::Path;

/// Discover all recognized source files under `root`.
///
/// Fails with `CoreError::PathInvalid` if `root` does not exist or is not a
/// directory.
pub fn discover_files(
    root: &Path,
    config: &AnalysisConfig,
) -> Result<Vec<FileDescriptor>, CoreError> {
    if !root.is_dir() {
        return Err(CoreError::PathInvalid(root.to_path_buf()));
    }

    let canonical_root = root
        .canonicalize()
        .map_err(|_| CoreError::PathInvalid(root.to_path_buf()))?;

    let mut files = Vec::new();

    let walker = build_walker(&canonical_root, config);

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "error walking directory during discovery");
                continue;
            }
        };

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        let language = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => match Language::from_extension(ext) {
                Some(lang) => lang,
                None => continue,
            },
            None => continue,
        };

        let metadata = match entry.metadata() {
            Ok(meta) => meta,
            Err(_) => continue,
        };

        let content = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(_) => continue,
        };
        let text = match String::from_utf8(content) {
            Ok(text) => text,
            Err(_) => continue,
        };

        let relative = path
            .strip_prefix(&canonical_root)
            .unwrap_or(path)
            .to_path_buf();

        files.push(FileDescriptor {
            absolute_path: path.to_path_buf(),
            path_relative_to_root: relative,
            language,
            size_bytes: metadata.len(),
            line_count: count_logical_lines(&text),
        });
    }

    // Deterministic ordering: discovery order drives every later ordering
    // guarantee, so sort by relative path once up front.
    files.sort_by(|a, b| a.path_relative_to_root.cmp(&b.path_relative_to_root));

    Ok(files)
}

/// Build a `WalkBuilder` that prunes denylisted and dot-prefixed
/// directories, with `.gitignore`/`.git/info/exclude` consultation turned
/// off entirely.
fn build_walker(root: &Path, config: &AnalysisConfig) -> ignore::Walk {
    let config = config.clone();
    WalkBuilder::new(root)
        .git_ignore(false)
        .git_exclude(false)
        .git_global(false)
        .ignore(false)
        .hidden(false)
        .parents(false)
        .filter_entry(move |entry| {
            // Only directories are subject to denylist/dot-prefix pruning;
            // files are filtered later by extension.
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') || config.is_denylisted(&name) {
                    return false;
                }
            }
            true
        })
        .build()
}

/// Number of newline-terminated logical lines in `text`.
fn count_logical_lines(text: &str) -> usize {
    text.matches('\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_discover_basic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        File::create(root.join("main.py")).unwrap();
        File::create(root.join("utils.py")).unwrap();

        let files = discover_files(root, &AnalysisConfig::default()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.absolute_path.is_absolute()));
        assert!(files.iter().any(|f| f.absolute_path.ends_with("main.py")));
    }

    #[test]
    fn test_denylist_pruning() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("node_modules")).unwrap();
        File::create(root.join("node_modules/lib.js")).unwrap();
        File::create(root.join("main.js")).unwrap();

        let files = discover_files(root, &AnalysisConfig::default()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].absolute_path.ends_with("main.js"));
    }

    #[test]
    fn test_dot_directories_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join(".hidden")).unwrap();
        File::create(root.join(".hidden/secret.py")).unwrap();
        File::create(root.join("main.py")).unwrap();

        let files = discover_files(root, &AnalysisConfig::default()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].absolute_path.ends_with("main.py"));
    }

    #[test]
    fn test_unrecognized_extension_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        File::create(root.join("README.md")).unwrap();
        File::create(root.join("main.py")).unwrap();

        let files = discover_files(root, &AnalysisConfig::default()).unwrap();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_non_utf8_file_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut f = File::create(root.join("bad.py")).unwrap();
        f.write_all(&[0xff, 0xfe, 0x00, 0x01]).unwrap();
        File::create(root.join("good.py")).unwrap();

        let files = discover_files(root, &AnalysisConfig::default()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].absolute_path.ends_with("good.py"));
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = discover_files(temp_dir.path(), &AnalysisConfig::default()).unwrap();
        assert_eq!(files.len(), 0);
    }

    #[test]
    fn test_nonexistent_root_fails() {
        let result =
            discover_files(Path::new("/nonexistent/path/xyz"), &AnalysisConfig::default());
        assert!(matches!(result, Err(CoreError::PathInvalid(_))));
    }

    #[test]
    fn test_extra_denylist_entry() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("generated")).unwrap();
        File::create(root.join("generated/thing.py")).unwrap();
        File::create(root.join("main.py")).unwrap();

        let mut config = AnalysisConfig::default();
        config.extra_denylist.push("generated".to_string());

        let files = discover_files(root, &config).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].absolute_path.ends_with("main.py"));
    }
}
