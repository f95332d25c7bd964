//! Bookden record store
//!
//! Embedded persistence for book records: SQLite via sqlx underneath, a
//! read-through write-invalidate cache on top. Callers use [`BookStore`];
//! the `connection`/`migrations`/`queries` modules are the plumbing.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::{connect, DatabaseConfig, DbPool};
pub use migrations::{current_version, optimize, run_migrations, verify_integrity};
pub use store::{BookStore, SortField};

#[cfg(test)]
mod tests {
    use super::*;
    use bookden_core::{AppError, Book, BookPatch};
    use connection::create_test_db;

    #[tokio::test]
    async fn test_full_store_workflow() -> Result<(), AppError> {
        let pool = create_test_db().await?;
        run_migrations(&pool).await?;
        let store = BookStore::new(pool);

        let mut book = Book::new("J.R.R. Tolkien", "The Hobbit");
        book.tags = vec!["fantasy".to_string()];
        let inserted = store.insert(book).await?;

        let fetched = store.get(inserted.id).await?;
        assert_eq!(fetched.title, "The Hobbit");

        let updated = store
            .update(
                inserted.id,
                BookPatch {
                    description: Some(Some("There and back again.".to_string())),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(updated.description.as_deref(), Some("There and back again."));

        let hits = store.search("hobbit").await?;
        assert_eq!(hits.len(), 1);

        store.remove(inserted.id).await?;
        assert!(store.list_all().await?.is_empty());

        Ok(())
    }
}
