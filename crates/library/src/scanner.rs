//! Upload directory scanning
//!
//! Lists candidate files the user can import: everything under the upload
//! directory with an allowed e-book extension.

use crate::placement::is_allowed_extension;
use bookden_core::AppError;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One-shot scanner over the upload directory
#[derive(Debug, Clone)]
pub struct UploadScanner {
    root: PathBuf,
    max_depth: Option<usize>,
    follow_symlinks: bool,
}

impl UploadScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: Some(10),
            follow_symlinks: false,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Returns importable files under the root, sorted by path.
    /// Unreadable entries are skipped, not fatal.
    pub fn scan(&self) -> Result<Vec<PathBuf>, AppError> {
        if !self.root.is_dir() {
            return Err(AppError::validation(format!(
                "upload directory '{}' does not exist",
                self.root.display()
            )));
        }

        let mut walker = WalkDir::new(&self.root).follow_links(self.follow_symlinks);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_allowed_extension(path))
            .collect();

        files.sort();
        Ok(files)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_missing_directory() {
        let scanner = UploadScanner::new("/nonexistent/upload");
        assert!(matches!(scanner.scan(), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("b.epub"), b"x").unwrap();
        std::fs::write(dir.path().join("c.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("d.mobi"), b"x").unwrap();

        let files = UploadScanner::new(dir.path()).scan().unwrap();
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.epub"]);
    }

    #[test]
    fn test_scan_recurses_into_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/deep.docx"), b"x").unwrap();

        let files = UploadScanner::new(dir.path()).scan().unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_scan_respects_max_depth() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("a/b/deep.pdf"), b"x").unwrap();

        let files = UploadScanner::new(dir.path()).with_max_depth(1).scan().unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        let files = UploadScanner::new(dir.path()).scan().unwrap();
        assert!(files.is_empty());
    }
}
