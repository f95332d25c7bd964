//! High-level library management

use crate::import::{AddBookRequest, AddReport, AddedBook, BookImporter, ImportOptions};
use crate::naming::normalize_author;
use crate::scanner::UploadScanner;
use crate::tagger::{ExifToolTagger, MetadataTagger, NoopTagger};
pub use crate::LibraryConfig;
use bookden_core::{AppError, Book, BookId, BookPatch};
use bookden_store::{BookStore, DatabaseConfig, SortField};
use log::info;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Owns the store, the tagger, and the filesystem layout; everything the
/// shell needs behind one handle.
pub struct LibraryManager {
    store: Arc<BookStore>,
    importer: BookImporter,
    config: LibraryConfig,
}

impl LibraryManager {
    /// Opens the store (running migrations) and wires up the importer
    pub async fn new(config: LibraryConfig) -> Result<Self, AppError> {
        info!("opening library with database '{}'", config.db_path);

        let store = Arc::new(BookStore::open(DatabaseConfig::new(&config.db_path)).await?);

        let tagger: Arc<dyn MetadataTagger> = match &config.exiftool_path {
            Some(path) => Arc::new(ExifToolTagger::new(path)),
            None => {
                info!("no exiftool configured, metadata tagging disabled");
                Arc::new(NoopTagger)
            }
        };

        let importer = BookImporter::new(store.clone(), tagger, config.library_root.clone());

        Ok(Self {
            store,
            importer,
            config,
        })
    }

    /// Runs the add-book workflow
    pub async fn add_book(
        &self,
        request: AddBookRequest,
        options: ImportOptions,
    ) -> Result<AddedBook, AppError> {
        self.importer.add_book(request, options).await
    }

    /// Runs the add-book workflow and flattens the outcome for display
    pub async fn add_book_report(
        &self,
        request: AddBookRequest,
        options: ImportOptions,
    ) -> AddReport {
        self.importer.add_book_report(request, options).await
    }

    /// All books in store-insertion order
    pub async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        self.store.list_all().await
    }

    /// A single book by id
    pub async fn get_book(&self, id: BookId) -> Result<Book, AppError> {
        self.store.get(id).await
    }

    /// Case-insensitive substring search over title and author
    pub async fn search(&self, text: &str) -> Result<Vec<Book>, AppError> {
        self.store.search(text).await
    }

    /// Stable sort of the whole collection
    pub async fn sort_books(
        &self,
        field: SortField,
        descending: bool,
    ) -> Result<Vec<Book>, AppError> {
        self.store.sort(field, descending).await
    }

    /// Merges a partial update into an existing record
    pub async fn update_book(&self, id: BookId, patch: BookPatch) -> Result<Book, AppError> {
        self.store.update(id, patch).await
    }

    /// Removes the record. The backing file stays on disk.
    pub async fn remove_book(&self, id: BookId) -> Result<(), AppError> {
        self.store.remove(id).await
    }

    /// Stamps the book as read now
    pub async fn mark_read(&self, id: BookId) -> Result<Book, AppError> {
        let mut book = self.store.get(id).await?;
        book.mark_read();
        let patch = BookPatch {
            read: Some(book.read.clone()),
            ..Default::default()
        };
        self.store.update(id, patch).await
    }

    /// Clears the read marker
    pub async fn mark_unread(&self, id: BookId) -> Result<Book, AppError> {
        let patch = BookPatch {
            read: Some(None),
            ..Default::default()
        };
        self.store.update(id, patch).await
    }

    /// Absolute path of the book's file inside the library tree
    pub fn book_path(&self, book: &Book) -> Result<PathBuf, AppError> {
        let filename = book
            .filename
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| AppError::validation("book has no file attached"))?;
        Ok(PathBuf::from(&self.config.library_root)
            .join(normalize_author(&book.author))
            .join(filename))
    }

    /// Importable files waiting in the upload directory
    pub fn incoming(&self) -> Result<Vec<PathBuf>, AppError> {
        let upload_dir = self
            .config
            .upload_dir
            .as_deref()
            .ok_or_else(|| AppError::validation("no upload directory configured"))?;
        UploadScanner::new(upload_dir).scan()
    }

    /// Library statistics
    pub async fn stats(&self) -> Result<LibraryStats, AppError> {
        let books = self.list_books().await?;

        let total_books = books.len();
        let read_count = books.iter().filter(|b| b.is_read()).count();
        let unique_authors = books
            .iter()
            .map(|b| b.author.as_str())
            .collect::<HashSet<_>>()
            .len();
        let unique_tags = books
            .iter()
            .flat_map(|b| b.tags.iter())
            .map(|t| t.as_str())
            .collect::<HashSet<_>>()
            .len();

        Ok(LibraryStats {
            total_books,
            read_count,
            unique_authors,
            unique_tags,
        })
    }

    /// Underlying store handle for maintenance operations
    pub fn store(&self) -> &BookStore {
        &self.store
    }
}

#[derive(Debug, Clone)]
pub struct LibraryStats {
    pub total_books: usize,
    pub read_count: usize,
    pub unique_authors: usize,
    pub unique_tags: usize,
}
