//! External metadata tagger boundary
//!
//! Stamps title/author/keywords onto a placed file by shelling out to
//! exiftool. Tagging is best-effort: the workflow downgrades every
//! [`TagError`] to a warning and never rolls anything back because of one.

use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Formats exiftool can rewrite in place. OOXML containers (docx, pptx)
/// are not rewritable this way and are skipped.
pub const TAGGABLE_EXTENSIONS: &[&str] = &["pdf", "epub"];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns true if the external tool can stamp this file type
pub fn is_taggable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TAGGABLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Metadata fields written onto the file
#[derive(Debug, Clone, Default)]
pub struct TagFields {
    pub title: String,
    pub author: String,
    pub keywords: Vec<String>,
    pub description: Option<String>,
}

/// Errors from the external tagging tool
#[derive(Error, Debug)]
pub enum TagError {
    #[error("exiftool not found at '{path}'")]
    ToolNotFound { path: PathBuf },

    #[error("exiftool exited with status {status}: {stderr}")]
    ToolFailed { status: i32, stderr: String },

    #[error("exiftool timed out after {seconds}s")]
    TimedOut { seconds: u64 },

    #[error("failed to run exiftool: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes metadata onto a placed file. Substitutable so tests and
/// tool-less setups can run the workflow unchanged.
#[async_trait]
pub trait MetadataTagger: Send + Sync {
    async fn tag(&self, path: &Path, fields: &TagFields) -> Result<(), TagError>;
}

/// Tagger backed by the operator-configured exiftool executable
pub struct ExifToolTagger {
    exiftool: PathBuf,
    timeout: Duration,
}

impl ExifToolTagger {
    pub fn new(exiftool: impl Into<PathBuf>) -> Self {
        Self {
            exiftool: exiftool.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MetadataTagger for ExifToolTagger {
    async fn tag(&self, path: &Path, fields: &TagFields) -> Result<(), TagError> {
        let mut cmd = Command::new(&self.exiftool);
        cmd.arg("-charset")
            .arg("utf8")
            .arg(format!("-Title={}", fields.title))
            .arg(format!("-Author={}", fields.author))
            .arg(format!("-Keywords={}", fields.keywords.join(",")));
        if let Some(description) = &fields.description {
            cmd.arg(format!("-Description={}", description));
        }
        cmd.arg("-overwrite_original")
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!("running exiftool for '{}'", path.display());

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TagError::ToolNotFound {
                    path: self.exiftool.clone(),
                })
            }
            Ok(Err(e)) => return Err(TagError::Io(e)),
            Err(_) => {
                return Err(TagError::TimedOut {
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(TagError::ToolFailed {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }
        if !stderr.is_empty() {
            warn!("exiftool stderr for '{}': {}", path.display(), stderr);
        }

        Ok(())
    }
}

/// Tagger that writes nothing; used in tests and when no tool is configured
pub struct NoopTagger;

#[async_trait]
impl MetadataTagger for NoopTagger {
    async fn tag(&self, _path: &Path, _fields: &TagFields) -> Result<(), TagError> {
        Ok(())
    }
}
