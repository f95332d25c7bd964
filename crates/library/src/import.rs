//! Add-book workflow
//!
//! The sequential pipeline behind every import:
//! validate input, place the file in the library tree, stamp metadata
//! (best-effort), commit the record. A commit failure after a successful
//! placement triggers a compensating removal of the placed copy; if that
//! removal also fails the workflow surfaces the one fatal outcome,
//! [`AppError::RollbackFailure`]. Nothing is ever retried automatically.

use crate::placement::place_file;
use crate::tagger::{is_taggable, MetadataTagger, TagFields};
use bookden_core::{dedup_tags, AppError, Book};
use bookden_store::BookStore;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the user supplies for one import
#[derive(Debug, Clone)]
pub struct AddBookRequest {
    pub source: PathBuf,
    pub author: String,
    pub title: String,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub series: Option<String>,
    pub series_index: Option<f32>,
}

impl AddBookRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        author: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            author: author.into(),
            title: title.into(),
            tags: Vec::new(),
            description: None,
            series: None,
            series_index: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_series(mut self, series: impl Into<String>, index: Option<f32>) -> Self {
        self.series = Some(series.into());
        self.series_index = index;
        self
    }
}

/// Import behavior knobs
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Delete the source file after a successful commit (move semantics).
    /// Off by default: the user's original is never at risk.
    pub remove_source: bool,
    /// Invoke the external metadata tool for taggable formats
    pub write_metadata: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            remove_source: false,
            write_metadata: true,
        }
    }
}

/// Successful import result
#[derive(Debug, Clone)]
pub struct AddedBook {
    pub book: Book,
    pub path: PathBuf,
    /// Downgraded non-fatal problem (tagging failure, source not removed)
    pub warning: Option<String>,
}

/// Flat result shape consumed by the shell
#[derive(Debug, Clone)]
pub struct AddReport {
    pub success: bool,
    pub message: String,
    pub path: Option<PathBuf>,
}

impl AddReport {
    /// Flattens a workflow result into the display shape. The four failure
    /// outcomes keep distinguishable messages; a commit failure explicitly
    /// says whether the placement was reverted.
    pub fn from_result(result: &Result<AddedBook, AppError>) -> Self {
        match result {
            Ok(added) => {
                let mut message = format!(
                    "Book added: {} by {}\nFile saved to: {}",
                    added.book.title,
                    added.book.author,
                    added.path.display()
                );
                if let Some(warning) = &added.warning {
                    message.push_str(&format!("\nWarning: {}", warning));
                }
                Self {
                    success: true,
                    message,
                    path: Some(added.path.clone()),
                }
            }
            Err(err @ AppError::Store { .. }) => Self {
                success: false,
                message: format!("{}. File placement was reverted; the library is unchanged.", err),
                path: None,
            },
            Err(err) => Self {
                success: false,
                message: format!("{}", err),
                path: None,
            },
        }
    }
}

/// Orchestrates the add-book pipeline
pub struct BookImporter {
    store: Arc<BookStore>,
    tagger: Arc<dyn MetadataTagger>,
    library_root: PathBuf,
}

impl BookImporter {
    pub fn new(
        store: Arc<BookStore>,
        tagger: Arc<dyn MetadataTagger>,
        library_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            tagger,
            library_root: library_root.into(),
        }
    }

    /// Runs the full add-book workflow.
    ///
    /// Terminal outcomes, in pipeline order:
    /// - `Validation`: bad input, no side effects
    /// - `Conflict` / `Filesystem`: placement failed, source intact
    /// - `Store`: commit failed, placed copy removed, library unchanged
    /// - `RollbackFailure`: commit failed AND the placed copy could not be
    ///   removed; fatal, requires manual intervention
    pub async fn add_book(
        &self,
        request: AddBookRequest,
        options: ImportOptions,
    ) -> Result<AddedBook, AppError> {
        let author = request.author.trim().to_string();
        let title = request.title.trim().to_string();

        if author.is_empty() {
            return Err(AppError::validation("author is required"));
        }
        if title.is_empty() {
            return Err(AppError::validation("title is required"));
        }

        let placed = place_file(&self.library_root, &author, &title, &request.source).await?;

        let tags = dedup_tags(&request.tags);
        let mut warning = None;

        if options.write_metadata {
            if is_taggable(placed.target()) {
                let fields = TagFields {
                    title: title.clone(),
                    author: author.clone(),
                    keywords: tags.clone(),
                    description: request.description.clone(),
                };
                if let Err(e) = self.tagger.tag(placed.target(), &fields).await {
                    warn!(
                        "metadata tagging failed for '{}': {}",
                        placed.target().display(),
                        e
                    );
                    warning = Some(format!("metadata not written: {}", e));
                }
            } else {
                debug!(
                    "skipping metadata tagging for '{}': format not taggable",
                    placed.target().display()
                );
            }
        }

        let mut book = Book::new(author, title);
        book.tags = tags;
        book.filename = Some(placed.filename().to_string());
        book.description = request.description.filter(|d| !d.trim().is_empty());
        book.series = request.series.filter(|s| !s.trim().is_empty());
        book.series_index = request.series_index;

        match self.store.insert(book).await {
            Ok(book) => {
                if options.remove_source {
                    if let Err(e) = placed.remove_source().await {
                        warn!(
                            "source '{}' could not be removed after commit: {}",
                            request.source.display(),
                            e
                        );
                        let note = format!("source file not removed: {}", e);
                        warning = Some(match warning {
                            Some(existing) => format!("{}; {}", existing, note),
                            None => note,
                        });
                    }
                }
                info!(
                    "book '{}' committed with file '{}'",
                    book.title,
                    placed.target().display()
                );
                Ok(AddedBook {
                    path: placed.target().to_path_buf(),
                    book,
                    warning,
                })
            }
            Err(store_error) => match placed.revert().await {
                Ok(()) => {
                    error!(
                        "record commit failed, placed file '{}' removed: {}",
                        placed.target().display(),
                        store_error
                    );
                    Err(store_error)
                }
                Err(rollback_error) => {
                    let err = AppError::RollbackFailure {
                        path: placed.target().to_path_buf(),
                        store_error: store_error.to_string(),
                        rollback_error: rollback_error.to_string(),
                    };
                    error!("{}", err);
                    Err(err)
                }
            },
        }
    }

    /// Convenience wrapper returning the shell's flat result shape
    pub async fn add_book_report(
        &self,
        request: AddBookRequest,
        options: ImportOptions,
    ) -> AddReport {
        AddReport::from_result(&self.add_book(request, options).await)
    }

    pub fn library_root(&self) -> &Path {
        &self.library_root
    }
}
