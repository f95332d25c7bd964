//! Bookden library management
//!
//! High-level orchestration layer that coordinates core, store, and
//! filesystem. Provides the add-book workflow, the author-keyed file
//! layout, the external metadata tagger boundary, and upload-directory
//! scanning.

pub mod import;
pub mod manager;
pub mod naming;
pub mod placement;
pub mod scanner;
pub mod tagger;

pub use import::{AddBookRequest, AddReport, AddedBook, BookImporter, ImportOptions};
pub use manager::{LibraryManager, LibraryStats};
pub use naming::{compose_filename, normalize_author, validate_filename};
pub use placement::{is_allowed_extension, place_file, PlacedFile, ALLOWED_EXTENSIONS};
pub use scanner::UploadScanner;
pub use tagger::{
    is_taggable, ExifToolTagger, MetadataTagger, NoopTagger, TagError, TagFields,
    TAGGABLE_EXTENSIONS,
};

use std::path::{Path, PathBuf};

/// Library configuration
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Database file path
    pub db_path: String,
    /// Base directory of the author-keyed library tree
    pub library_root: PathBuf,
    /// Directory scanned for importable files, if any
    pub upload_dir: Option<PathBuf>,
    /// Path to the exiftool executable; None disables metadata tagging
    pub exiftool_path: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            db_path: "bookden.db".to_string(),
            library_root: PathBuf::from("library"),
            upload_dir: None,
            exiftool_path: None,
        }
    }
}

impl LibraryConfig {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Default::default()
        }
    }

    pub fn with_library_root(mut self, root: impl AsRef<Path>) -> Self {
        self.library_root = root.as_ref().to_path_buf();
        self
    }

    pub fn with_upload_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.upload_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_exiftool(mut self, path: impl AsRef<Path>) -> Self {
        self.exiftool_path = Some(path.as_ref().to_path_buf());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LibraryConfig::default();
        assert_eq!(config.db_path, "bookden.db");
        assert!(config.upload_dir.is_none());
        assert!(config.exiftool_path.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = LibraryConfig::new("custom.db")
            .with_library_root("/books")
            .with_upload_dir("/incoming")
            .with_exiftool("/usr/bin/exiftool");

        assert_eq!(config.db_path, "custom.db");
        assert_eq!(config.library_root, PathBuf::from("/books"));
        assert_eq!(config.upload_dir, Some(PathBuf::from("/incoming")));
        assert_eq!(config.exiftool_path, Some(PathBuf::from("/usr/bin/exiftool")));
    }
}
