//! Reference dataset discovery utilities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{CodeMapError, CodeMapResult};

/// File name the reference dataset is published under.
pub const DATASET_FILE_NAME: &str = "PDQ_TO_NCI_MAP.csv";

/// Resolves the reference dataset from a file or directory path.
///
/// A file path is returned as-is. For a directory, the published dataset
/// name is looked up (case-insensitively) in the directory itself and in a
/// `data` subdirectory.
pub fn discover_dataset<P: AsRef<Path>>(path: P) -> CodeMapResult<PathBuf> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CodeMapError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    for dir in [path.to_path_buf(), path.join("data")] {
        if let Some(found) = find_dataset_in(&dir)? {
            return Ok(found);
        }
    }

    Err(CodeMapError::DatasetMissing {
        directory: path.display().to_string(),
    })
}

fn find_dataset_in(dir: &Path) -> CodeMapResult<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let filename = entry.file_name();
        if filename
            .to_string_lossy()
            .eq_ignore_ascii_case(DATASET_FILE_NAME)
        {
            return Ok(Some(entry.path()));
        }
    }

    Ok(None)
}

/// Formats a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.csv");
        fs::write(&file, "CDR0000000001,C1\n").unwrap();
        assert_eq!(discover_dataset(&file).unwrap(), file);
    }

    #[test]
    fn test_discover_in_data_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        let file = dir.path().join("data").join("pdq_to_nci_map.csv");
        fs::write(&file, "").unwrap();
        assert_eq!(discover_dataset(dir.path()).unwrap(), file);
    }

    #[test]
    fn test_discover_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_dataset(dir.path()),
            Err(CodeMapError::DatasetMissing { .. })
        ));
        assert!(matches!(
            discover_dataset(dir.path().join("nope")),
            Err(CodeMapError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 bytes");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }
}
