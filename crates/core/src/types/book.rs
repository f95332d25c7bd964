//! Book record domain model

use crate::types::{Timestamp, Validator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a book record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    /// Creates a new random BookId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a BookId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the BookId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A book record as persisted in the store.
///
/// `filename` is relative to the author's subdirectory under the library
/// root; when it is set, the workflow guarantees the file existed there at
/// the moment the record was committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub author: String,
    pub title: String,
    pub added: Timestamp,
    pub tags: Vec<String>,
    pub filename: Option<String>,
    pub other_formats: Vec<String>,
    pub series: Option<String>,
    pub series_index: Option<f32>,
    pub description: Option<String>,
    /// None or empty = unread, otherwise the timestamp string of when it was read
    pub read: Option<String>,
}

impl Book {
    /// Creates a new book with required fields; assigns a fresh id and the
    /// current timestamp
    pub fn new(author: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: BookId::new(),
            author: author.into(),
            title: title.into(),
            added: Timestamp::now(),
            tags: Vec::new(),
            filename: None,
            other_formats: Vec::new(),
            series: None,
            series_index: None,
            description: None,
            read: None,
        }
    }

    /// Returns true if the book carries a read marker
    pub fn is_read(&self) -> bool {
        self.read
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }

    /// Stamps the book as read now
    pub fn mark_read(&mut self) {
        self.read = Some(Timestamp::now().format_display());
    }

    /// Clears the read marker
    pub fn mark_unread(&mut self) {
        self.read = None;
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.author.trim().is_empty() {
            errors.push("Author cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            errors.push("Title cannot be empty".to_string());
        }

        if self.tags.iter().any(|t| t.trim().is_empty()) {
            errors.push("Tags cannot contain empty entries".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        if !self.tags.iter().all(|t| seen.insert(t.as_str())) {
            errors.push("Tags cannot contain duplicates".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update for a book record.
///
/// There is no `id` field: the identifier is immutable by construction.
/// Outer `Some` means "set this field"; for optional record fields the inner
/// `Option` distinguishes setting a value from clearing it.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub author: Option<String>,
    pub title: Option<String>,
    pub added: Option<Timestamp>,
    pub tags: Option<Vec<String>>,
    pub filename: Option<Option<String>>,
    pub other_formats: Option<Vec<String>>,
    pub series: Option<Option<String>>,
    pub series_index: Option<Option<f32>>,
    pub description: Option<Option<String>>,
    pub read: Option<Option<String>>,
}

impl BookPatch {
    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.title.is_none()
            && self.added.is_none()
            && self.tags.is_none()
            && self.filename.is_none()
            && self.other_formats.is_none()
            && self.series.is_none()
            && self.series_index.is_none()
            && self.description.is_none()
            && self.read.is_none()
    }

    /// Merges the patch into an existing record. Tags are re-normalized so
    /// the deduplication invariant holds for every ingress path.
    pub fn apply(&self, book: &mut Book) {
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(added) = self.added {
            book.added = added;
        }
        if let Some(tags) = &self.tags {
            book.tags = dedup_tags(tags);
        }
        if let Some(filename) = &self.filename {
            book.filename = filename.clone();
        }
        if let Some(other_formats) = &self.other_formats {
            book.other_formats = other_formats.clone();
        }
        if let Some(series) = &self.series {
            book.series = series.clone();
        }
        if let Some(series_index) = self.series_index {
            book.series_index = series_index;
        }
        if let Some(description) = &self.description {
            book.description = description.clone();
        }
        if let Some(read) = &self.read {
            book.read = read.clone();
        }
    }
}

/// Splits a raw comma-separated tag string into a clean tag set:
/// trimmed, empty entries dropped, deduplicated case-sensitively, sorted.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    dedup_tags(&raw.split(',').map(|t| t.to_string()).collect::<Vec<_>>())
}

/// Cleans an already-split tag list: trims, drops empties, dedups
/// case-sensitively, sorts.
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<String> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(|t| t.to_string())
        .collect();
    out.sort();
    out
}
