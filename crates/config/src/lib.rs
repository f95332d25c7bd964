//! Bookden configuration
//!
//! One explicit settings struct, constructed at process start and passed by
//! reference into the library layer. Persisted as TOML with atomic writes;
//! an invalid or missing file falls back to defaults with a warning rather
//! than aborting the shell.

mod error;

pub use error::{ConfigError, ConfigResult};

use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Operator-configured paths for the library manager
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Path to the record store database file
    pub db_path: String,
    /// Base directory of the author-keyed library tree
    pub library_root: PathBuf,
    /// Directory scanned for importable files
    pub upload_dir: PathBuf,
    /// Path to the exiftool executable; empty disables metadata tagging
    pub exiftool_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: "bookden.db".to_string(),
            library_root: PathBuf::from("library"),
            upload_dir: PathBuf::from("incoming"),
            exiftool_path: None,
        }
    }
}

impl Settings {
    /// Default config file location under the user's config directory
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("", "", "bookden").ok_or_else(|| {
            ConfigError::PathResolutionError {
                reason: "no home directory available".to_string(),
            }
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Loads settings from a TOML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings, falling back to defaults (with a warning) when the
    /// file is missing or unreadable
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("config at '{}' not usable ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Saves settings atomically: write to a temp file in the target
    /// directory, then rename over the destination
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::DirectoryCreationError {
            path: parent.to_path_buf(),
            source,
        })?;

        let rendered = toml::to_string_pretty(self)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(rendered.as_bytes())
            .map_err(|source| ConfigError::WriteError {
                path: path.to_path_buf(),
                source,
            })?;
        tmp.persist(path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        Ok(())
    }

    /// Checks the settings for obviously unusable values
    pub fn validate(&self) -> ConfigResult<()> {
        let mut problems = Vec::new();

        if self.db_path.trim().is_empty() {
            problems.push("db_path must not be empty".to_string());
        }
        if self.library_root.as_os_str().is_empty() {
            problems.push("library_root must not be empty".to_string());
        }
        if self.upload_dir.as_os_str().is_empty() {
            problems.push("upload_dir must not be empty".to_string());
        }
        if let Some(exiftool) = &self.exiftool_path {
            if exiftool.as_os_str().is_empty() {
                problems.push("exiftool_path must not be empty when set".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(problems.join("; ")))
        }
    }
}
