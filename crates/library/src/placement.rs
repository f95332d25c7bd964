//! Library filesystem manager
//!
//! Translates an (author, title, source file) triple into a committed file
//! inside the library tree. Placement always copies; the source file is
//! only ever removed by [`PlacedFile::remove_source`] after the record
//! commit has succeeded.

use crate::naming::{compose_filename, normalize_author, validate_filename};
use bookden_core::AppError;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Source file extensions accepted for import (case-insensitive)
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "epub", "docx", "pptx"];

/// Returns true if the path carries an allowed e-book extension
pub fn is_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// A file successfully copied into the library tree
#[derive(Debug)]
pub struct PlacedFile {
    source: PathBuf,
    target: PathBuf,
    filename: String,
}

impl PlacedFile {
    /// Absolute path of the placed copy
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// File name relative to the author's subdirectory
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Removes the placed copy. The rollback primitive: the source file is
    /// untouched because placement copied.
    pub async fn revert(&self) -> std::io::Result<()> {
        tokio::fs::remove_file(&self.target).await
    }

    /// Removes the original source file. Only called after the record
    /// commit succeeded and the caller asked for move semantics.
    pub async fn remove_source(&self) -> std::io::Result<()> {
        tokio::fs::remove_file(&self.source).await
    }
}

/// Copies `source` into `<library_root>/<normalize(author)>/<title> - <author><ext>`.
///
/// All validation (source exists and is a regular file of an allowed type,
/// composed file name is legal) happens before any filesystem mutation.
/// The collision check runs strictly before the copy; an existing target
/// fails the operation without touching either file. On a copy failure the
/// partially-written target is removed and the source is left intact.
pub async fn place_file(
    library_root: &Path,
    author: &str,
    title: &str,
    source: &Path,
) -> Result<PlacedFile, AppError> {
    let metadata = tokio::fs::metadata(source).await.map_err(|_| {
        AppError::validation(format!(
            "unsupported or missing file: '{}'",
            source.display()
        ))
    })?;
    if !metadata.is_file() || !is_allowed_extension(source) {
        return Err(AppError::validation(format!(
            "unsupported or missing file: '{}' (allowed: {})",
            source.display(),
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let author = author.trim();
    let title = title.trim();

    let dir_name = normalize_author(author);
    if dir_name.is_empty() {
        return Err(AppError::validation("author is required"));
    }

    // extension() is Some here: is_allowed_extension passed
    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let filename = compose_filename(title, author, &extension);
    validate_filename(&filename)?;

    let target_dir = library_root.join(&dir_name);
    tokio::fs::create_dir_all(&target_dir).await.map_err(|e| {
        AppError::filesystem(
            format!("failed to create directory '{}'", target_dir.display()),
            e,
        )
    })?;

    let target = target_dir.join(&filename);
    let exists = tokio::fs::try_exists(&target).await.map_err(|e| {
        AppError::filesystem(format!("failed to stat '{}'", target.display()), e)
    })?;
    if exists {
        return Err(AppError::conflict(target));
    }

    if let Err(e) = tokio::fs::copy(source, &target).await {
        // Best-effort cleanup of a partial copy; the source is untouched
        if let Err(cleanup) = tokio::fs::remove_file(&target).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "could not clean up partial copy at '{}': {}",
                    target.display(),
                    cleanup
                );
            }
        }
        return Err(AppError::filesystem(
            format!(
                "failed to copy '{}' to '{}'",
                source.display(),
                target.display()
            ),
            e,
        ));
    }

    info!("placed '{}' as '{}'", source.display(), target.display());

    Ok(PlacedFile {
        source: source.to_path_buf(),
        target,
        filename,
    })
}
