//! Handler-file detection.
//!
//! Scans the immediate files of an extracted bundle for an entry whose
//! extension matches a known language convention.

use std::fs;
use std::path::Path;

use crate::error::DetectionError;
use crate::types::Language;

/// Find the function's entry point in `dir`.
///
/// Only immediate files are considered; subdirectories are never
/// descended into. The first file (in directory-listing order) whose
/// extension matches a [`Language`] convention wins. Exactly one handler
/// file per function is supported; when several candidates exist the
/// listing order decides, and that order is not guaranteed stable across
/// platforms or filesystems.
pub fn detect_handler(dir: &Path) -> Result<(String, Language), DetectionError> {
    let entries = fs::read_dir(dir).map_err(|e| DetectionError::Scan {
        dir: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| DetectionError::Scan {
            dir: dir.to_path_buf(),
            source: e,
        })?;

        let is_file = entry
            .file_type()
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        let ext = Path::new(name.as_ref())
            .extension()
            .and_then(|e| e.to_str());

        if let Some(language) = ext.and_then(Language::from_extension) {
            return Ok((name.into_owned(), language));
        }
    }

    Err(DetectionError::NoHandlerFound {
        dir: dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_detect_python_handler() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("handler.py"), "print('hi')").unwrap();

        let (name, language) = detect_handler(dir.path()).unwrap();
        assert_eq!(name, "handler.py");
        assert_eq!(language, Language::Python);
    }

    #[test]
    fn test_detect_go_handler() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.go"), "package main").unwrap();

        let (name, language) = detect_handler(dir.path()).unwrap();
        assert_eq!(name, "main.go");
        assert_eq!(language, Language::Go);
    }

    #[test]
    fn test_unrecognized_files_fail() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();

        let err = detect_handler(dir.path()).unwrap_err();
        assert!(matches!(err, DetectionError::NoHandlerFound { .. }));
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/handler.py"), "print('hi')").unwrap();

        let err = detect_handler(dir.path()).unwrap_err();
        assert!(matches!(err, DetectionError::NoHandlerFound { .. }));
    }

    #[test]
    fn test_empty_directory_fails() {
        let dir = TempDir::new().unwrap();
        let err = detect_handler(dir.path()).unwrap_err();
        assert!(matches!(err, DetectionError::NoHandlerFound { .. }));
    }
}
