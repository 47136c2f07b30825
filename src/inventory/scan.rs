use std::fs;
use std::path::Path;
use tracing::debug;

use super::error::InventoryError;
use super::types::{Candidate, Tier};

/// Lists the model executables in `models_dir`.
///
/// Only regular files whose extension matches `extension` (case-insensitive,
/// without the dot) are returned, sorted by filename. Failing to list the
/// directory is the only error.
pub fn enumerate(models_dir: &Path, extension: &str) -> Result<Vec<Candidate>, InventoryError> {
    let unavailable = |source| InventoryError::DirectoryUnavailable {
        path: models_dir.to_path_buf(),
        source,
    };

    let mut candidates: Vec<Candidate> = fs::read_dir(models_dir)
        .map_err(unavailable)?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            let filename = entry.file_name().to_string_lossy().to_string();
            let matches = path
                .extension()
                .map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
            if !matches {
                debug!(filename = %filename, "Skipping non-executable file");
                return None;
            }
            let identifier = path.file_stem()?.to_string_lossy().to_string();
            Some(Candidate {
                tier: Tier::classify(&identifier),
                filename,
                identifier,
                path,
            })
        })
        .collect();

    candidates.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_filters_by_extension_and_classifies() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "root_shape.exe");
        touch(temp.path(), "leaves_color.EXE");
        touch(temp.path(), "helper.exe");
        touch(temp.path(), "root_notes.txt");
        touch(temp.path(), "models.json");
        fs::create_dir(temp.path().join("root_dir.exe")).unwrap();

        let candidates = enumerate(temp.path(), "exe").unwrap();
        let names: Vec<_> = candidates.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["helper.exe", "leaves_color.EXE", "root_shape.exe"]);

        assert_eq!(candidates[0].tier, None);
        assert_eq!(candidates[1].identifier, "leaves_color");
        assert_eq!(candidates[1].tier, Some(Tier::Leaves));
        assert_eq!(candidates[2].tier, Some(Tier::Root));
        assert_eq!(candidates[2].path, temp.path().join("root_shape.exe"));
    }

    #[test]
    fn test_dotfiles_with_the_extension_are_listed() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".root_hidden.exe");
        touch(temp.path(), "root_shape.exe");

        let candidates = enumerate(temp.path(), "exe").unwrap();
        let names: Vec<_> = candidates.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec![".root_hidden.exe", "root_shape.exe"]);
        assert_eq!(candidates[0].identifier, ".root_hidden");
        assert_eq!(candidates[0].tier, None);
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let err = enumerate(&temp.path().join("missing"), "exe").unwrap_err();
        assert!(matches!(err, InventoryError::DirectoryUnavailable { .. }));
    }

    #[test]
    fn test_empty_directory_has_no_candidates() {
        let temp = TempDir::new().unwrap();
        assert!(enumerate(temp.path(), "exe").unwrap().is_empty());
    }
}
