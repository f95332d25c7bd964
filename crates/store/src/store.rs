//! Cache-backed book record store
//!
//! [`BookStore`] is the single entry point for record access. Reads go
//! through an in-memory cache of the whole collection; every successful
//! mutation invalidates the cache before the call returns, so no reader can
//! observe a mutated store through a stale cache. The cache is rebuilt
//! lazily by the first read after an invalidation.

use crate::connection::{connect, DatabaseConfig, DbPool};
use crate::migrations::run_migrations;
use crate::queries::books;
use bookden_core::{AppError, Book, BookId, BookPatch, Validator};
use log::debug;
use std::cmp::Ordering;
use std::str::FromStr;
use tokio::sync::Mutex;

/// Field to sort the collection by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Added,
    Author,
    Title,
    Series,
    Read,
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "added" => Ok(Self::Added),
            "author" => Ok(Self::Author),
            "title" => Ok(Self::Title),
            "series" => Ok(Self::Series),
            "read" => Ok(Self::Read),
            other => Err(AppError::validation(format!(
                "unknown sort field '{}' (expected added, author, title, series or read)",
                other
            ))),
        }
    }
}

/// The book record store: persistence plus read cache.
///
/// The cache holds the full collection in store-insertion order, which is
/// what makes the stable sort's tie-breaking deterministic.
pub struct BookStore {
    pool: DbPool,
    cache: Mutex<Option<Vec<Book>>>,
}

impl BookStore {
    /// Wraps an already-connected pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            cache: Mutex::new(None),
        }
    }

    /// Connects to the database, runs migrations, and returns a ready store
    pub async fn open(config: DatabaseConfig) -> Result<Self, AppError> {
        let pool = connect(config).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool for maintenance operations
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Returns the collection snapshot, rebuilding the cache if stale
    async fn snapshot(&self) -> Result<Vec<Book>, AppError> {
        let mut guard = self.cache.lock().await;
        if let Some(cached) = guard.as_ref() {
            return Ok(cached.clone());
        }
        debug!("rebuilding book cache from store scan");
        let all = books::list_books(&self.pool).await?;
        *guard = Some(all.clone());
        Ok(all)
    }

    /// Inserts a new record. The record keeps the id it was created with.
    pub async fn insert(&self, book: Book) -> Result<Book, AppError> {
        book.validate()
            .map_err(|errors| AppError::validation(errors.join("; ")))?;

        // Holding the cache lock across the write keeps invalidation atomic
        // with respect to the mutating call.
        let mut guard = self.cache.lock().await;
        books::insert_book(&self.pool, &book).await?;
        *guard = None;
        Ok(book)
    }

    /// Merges a partial update into the record matched by `id`.
    /// The id itself is not patchable.
    pub async fn update(&self, id: BookId, patch: BookPatch) -> Result<Book, AppError> {
        let mut book = self.get(id).await?;
        patch.apply(&mut book);
        book.validate()
            .map_err(|errors| AppError::validation(errors.join("; ")))?;

        let mut guard = self.cache.lock().await;
        let affected = books::update_book(&self.pool, &book).await?;
        if affected == 0 {
            return Err(AppError::not_found("Book", id));
        }
        *guard = None;
        Ok(book)
    }

    /// Deletes the record. The backing file, if any, is left in place.
    pub async fn remove(&self, id: BookId) -> Result<(), AppError> {
        let mut guard = self.cache.lock().await;
        let affected = books::delete_book(&self.pool, id).await?;
        if affected == 0 {
            return Err(AppError::not_found("Book", id));
        }
        *guard = None;
        Ok(())
    }

    /// Gets a single record by id
    pub async fn get(&self, id: BookId) -> Result<Book, AppError> {
        self.snapshot()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::not_found("Book", id))
    }

    /// Returns all records in store-insertion order
    pub async fn list_all(&self) -> Result<Vec<Book>, AppError> {
        self.snapshot().await
    }

    /// Case-insensitive substring search over title and author.
    /// An empty query returns the whole collection.
    pub async fn search(&self, text: &str) -> Result<Vec<Book>, AppError> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.list_all().await;
        }
        Ok(self
            .snapshot()
            .await?
            .into_iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&needle)
                    || b.author.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Returns records matching an arbitrary predicate
    pub async fn search_by<F>(&self, predicate: F) -> Result<Vec<Book>, AppError>
    where
        F: Fn(&Book) -> bool,
    {
        Ok(self
            .snapshot()
            .await?
            .into_iter()
            .filter(|b| predicate(b))
            .collect())
    }

    /// Stable sort over the full collection. Records comparing equal keep
    /// their store-insertion order; absent string fields compare as empty.
    pub async fn sort(&self, field: SortField, descending: bool) -> Result<Vec<Book>, AppError> {
        let mut all = self.snapshot().await?;
        if descending {
            all.sort_by(|a, b| compare_by(field, b, a));
        } else {
            all.sort_by(|a, b| compare_by(field, a, b));
        }
        Ok(all)
    }

    /// Returns the record count without materializing the cache
    pub async fn count(&self) -> Result<i64, AppError> {
        books::count_books(&self.pool).await
    }
}

fn compare_by(field: SortField, a: &Book, b: &Book) -> Ordering {
    match field {
        SortField::Added => a.added.cmp(&b.added),
        SortField::Author => a.author.cmp(&b.author),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Series => a
            .series
            .as_deref()
            .unwrap_or("")
            .cmp(b.series.as_deref().unwrap_or("")),
        SortField::Read => a
            .read
            .as_deref()
            .unwrap_or("")
            .cmp(b.read.as_deref().unwrap_or("")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use bookden_core::Timestamp;

    async fn setup() -> BookStore {
        let pool = create_test_db().await.expect("Failed to create test db");
        run_migrations(&pool).await.expect("Failed to migrate");
        BookStore::new(pool)
    }

    fn book(author: &str, title: &str) -> Book {
        Book::new(author, title)
    }

    #[tokio::test]
    async fn test_insert_then_read() {
        let store = setup().await;
        let inserted = store.insert(book("Author", "Title")).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, inserted.id);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_record() {
        let store = setup().await;
        let result = store.insert(book("", "Title")).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(store.list_all().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_reads_reflect_every_mutation() {
        let store = setup().await;

        let a = store.insert(book("A", "One")).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 1);

        let b = store.insert(book("B", "Two")).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 2);

        store
            .update(
                a.id,
                BookPatch {
                    title: Some("One Revised".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.get(a.id).await.unwrap().title, "One Revised");

        store.remove(b.id).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let store = setup().await;
        let result = store.get(BookId::new()).await;
        assert!(matches!(result, Err(AppError::RecordNotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = setup().await;
        let patch = BookPatch {
            title: Some("New".to_string()),
            ..Default::default()
        };
        let result = store.update(BookId::new(), patch).await;
        assert!(matches!(result, Err(AppError::RecordNotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let store = setup().await;
        let inserted = store.insert(book("Author", "Title")).await.unwrap();

        let updated = store
            .update(
                inserted.id,
                BookPatch {
                    author: Some("Renamed Author".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, inserted.id);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_emptied_title() {
        let store = setup().await;
        let inserted = store.insert(book("Author", "Title")).await.unwrap();

        let result = store
            .update(
                inserted.id,
                BookPatch {
                    title: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));

        // Record unchanged
        assert_eq!(store.get(inserted.id).await.unwrap().title, "Title");
    }

    #[tokio::test]
    async fn test_remove_missing_record() {
        let store = setup().await;
        let result = store.remove(BookId::new()).await;
        assert!(matches!(result, Err(AppError::RecordNotFound { .. })));
    }

    #[tokio::test]
    async fn test_search_title_and_author() {
        let store = setup().await;
        store.insert(book("Ursula K. Le Guin", "The Dispossessed")).await.unwrap();
        store.insert(book("Charles Dickens", "Great Expectations")).await.unwrap();

        let by_title = store.search("dispossessed").await.unwrap();
        assert_eq!(by_title.len(), 1);

        let by_author = store.search("DICKENS").await.unwrap();
        assert_eq!(by_author.len(), 1);

        let none = store.search("tolkien").await.unwrap();
        assert!(none.is_empty());

        let all = store.search("  ").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_search_by_predicate() {
        let store = setup().await;
        let mut tagged = book("A", "Tagged");
        tagged.tags = vec!["fiction".to_string()];
        store.insert(tagged).await.unwrap();
        store.insert(book("B", "Untagged")).await.unwrap();

        let hits = store
            .search_by(|b| b.tags.iter().any(|t| t == "fiction"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Tagged");
    }

    #[tokio::test]
    async fn test_sort_added_ties_keep_insertion_order() {
        let store = setup().await;
        let stamp = Timestamp::from_seconds(1_700_000_000);

        for title in ["First", "Second", "Third"] {
            let mut b = book("Author", title);
            b.added = stamp;
            store.insert(b).await.unwrap();
        }

        let sorted = store.sort(SortField::Added, false).await.unwrap();
        let titles: Vec<&str> = sorted.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_sort_added_descending() {
        let store = setup().await;
        for (title, secs) in [("Old", 100), ("New", 300), ("Mid", 200)] {
            let mut b = book("Author", title);
            b.added = Timestamp::from_seconds(secs);
            store.insert(b).await.unwrap();
        }

        let sorted = store.sort(SortField::Added, true).await.unwrap();
        let titles: Vec<&str> = sorted.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Mid", "Old"]);
    }

    #[tokio::test]
    async fn test_sort_absent_series_compares_as_empty() {
        let store = setup().await;
        let mut with_series = book("A", "In Series");
        with_series.series = Some("Saga".to_string());
        store.insert(with_series).await.unwrap();
        store.insert(book("B", "No Series")).await.unwrap();

        let sorted = store.sort(SortField::Series, false).await.unwrap();
        // "" sorts before "Saga"
        assert_eq!(sorted[0].title, "No Series");
        assert_eq!(sorted[1].title, "In Series");
    }

    #[tokio::test]
    async fn test_sort_field_from_str() {
        assert_eq!("added".parse::<SortField>().unwrap(), SortField::Added);
        assert_eq!("Title".parse::<SortField>().unwrap(), SortField::Title);
        assert!("pages".parse::<SortField>().is_err());
    }

    #[tokio::test]
    async fn test_count() {
        let store = setup().await;
        assert_eq!(store.count().await.unwrap(), 0);
        store.insert(book("A", "B")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
