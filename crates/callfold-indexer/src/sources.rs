//! Git-aware source discovery
//!
//! Directories are walked with the `ignore` crate so .gitignore and hidden
//! files are respected. Results are sorted, which keeps the concatenated
//! build input (and therefore the cache key) stable between runs.

use anyhow::{Context, Result};
use callfold_core::SourceFile;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Resolve files and directories into an ordered list of source paths.
///
/// Explicit files are kept in the order given. Each directory expands to its
/// matching files in sorted order. A path listed twice is kept once.
pub fn collect_sources(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut collected = Vec::new();

    for path in paths {
        if path.is_file() {
            collected.push(path.clone());
        } else if path.is_dir() {
            collected.extend(walk_directory(path, extensions)?);
        } else {
            anyhow::bail!("Path does not exist: {}", path.display());
        }
    }

    let mut seen = std::collections::HashSet::new();
    collected.retain(|p| seen.insert(p.clone()));

    tracing::debug!("Collected {} source files", collected.len());
    Ok(collected)
}

fn walk_directory(directory: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(directory)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !has_extension(path, extensions) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Whether `path` ends in one of `extensions` (given without the dot).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

/// Read every path in full, in order.
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(SourceFile::new(path.clone(), content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rs() -> Vec<String> {
        vec!["rs".to_string()]
    }

    #[test]
    fn test_directory_walk_is_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/b.rs"), "fn b() {}").unwrap();
        std::fs::write(dir.path().join("src/a.rs"), "fn a() {}").unwrap();
        std::fs::write(dir.path().join("src/nested/c.rs"), "fn c() {}").unwrap();
        std::fs::write(dir.path().join("README.md"), "# readme").unwrap();

        let files = collect_sources(&[dir.path().to_path_buf()], &rs()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("src/a.rs"),
                PathBuf::from("src/b.rs"),
                PathBuf::from("src/nested/c.rs"),
            ]
        );
    }

    #[test]
    fn test_gitignore_is_respected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        std::fs::create_dir_all(dir.path().join("generated")).unwrap();
        std::fs::write(dir.path().join("generated/out.rs"), "fn out() {}").unwrap();
        std::fs::write(dir.path().join("lib.rs"), "fn lib() {}").unwrap();

        let files = collect_sources(&[dir.path().to_path_buf()], &rs()).unwrap();

        assert_eq!(files, vec![dir.path().join("lib.rs")]);
    }

    #[test]
    fn test_explicit_files_keep_order() {
        let dir = TempDir::new().unwrap();
        let second = dir.path().join("z.rs");
        let first = dir.path().join("a.rs");
        std::fs::write(&second, "fn z() {}").unwrap();
        std::fs::write(&first, "fn a() {}").unwrap();

        let files = collect_sources(&[second.clone(), first.clone(), second.clone()], &rs()).unwrap();
        assert_eq!(files, vec![second.clone(), first]);

        let sources = read_sources(&files).unwrap();
        assert_eq!(sources[0].content, "fn z() {}");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("src/lib.rs"), &rs()));
        assert!(!has_extension(Path::new("output.dot"), &rs()));
        assert!(!has_extension(Path::new("Makefile"), &rs()));
        assert!(!has_extension(Path::new("src/lib.rs.bak"), &rs()));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = collect_sources(&[dir.path().join("nope")], &rs());

        assert!(result.is_err());
    }
}
