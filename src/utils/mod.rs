//! Utilities for path collection.

use crate::{Result, error::PdfStitchError};
use std::path::PathBuf;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Returns a flattened list of resolved paths in pattern order. A
/// pattern that is a plain existing path resolves to itself.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern)?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern.as_ref())
        .map_err(|err| PdfStitchError::invalid_config(err.to_string()))?;

    for entry in paths {
        let path = entry.map_err(|err| PdfStitchError::invalid_config(err.to_string()))?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_paths_expands_glob() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let pattern = format!("{}/*.pdf", dir.path().display());
        let paths = collect_paths_for_patterns([pattern]).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.extension().unwrap() == "pdf"));
    }

    #[test]
    fn test_collect_paths_plain_path_passes_through() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("only.pdf");
        std::fs::write(&file, b"x").unwrap();

        let paths = collect_paths_for_patterns([file.to_str().unwrap()]).unwrap();
        assert_eq!(paths, vec![file]);
    }

    #[test]
    fn test_collect_paths_invalid_pattern() {
        let result = collect_paths_for_patterns(["[unclosed"]);
        assert!(result.is_err());
    }
}
