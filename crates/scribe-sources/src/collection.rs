use std::path::PathBuf;

use scribe_core::{Error, Result};

/// Expand input arguments into a sorted, de-duplicated list of paths
///
/// Arguments containing glob metacharacters are expanded; anything else is
/// taken as a literal path so a missing file surfaces when it is loaded.
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if !is_glob(pattern) {
            files.push(PathBuf::from(pattern));
            continue;
        }

        let entries = glob::glob(pattern).map_err(|e| {
            Error::InvalidConfiguration(format!("Invalid glob pattern {}: {}", pattern, e))
        })?;
        for entry in entries {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }

    // Sort for determinism
    files.sort();
    files.dedup();

    tracing::debug!(inputs = patterns.len(), files = files.len(), "Expanded inputs");
    Ok(files)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_glob_sorted_and_deduplicated() {
        let dir = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "c.md"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        let txt = format!("{}/*.txt", dir.path().display());
        let literal = dir.path().join("a.txt").display().to_string();

        let files = expand_inputs(&[txt, literal]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_literal_paths_pass_through() {
        let files = expand_inputs(&["does/not/exist.txt"]).unwrap();
        assert_eq!(files, vec![PathBuf::from("does/not/exist.txt")]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            expand_inputs(&["[unclosed*"]),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
