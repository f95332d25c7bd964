//! Book record database operations

use crate::DbPool;
use bookden_core::{AppError, Book, BookId, Timestamp};

/// Inserts a new book record
pub async fn insert_book(pool: &DbPool, book: &Book) -> Result<(), AppError> {
    let tags_json = serde_json::to_string(&book.tags)
        .map_err(|e| AppError::store("Failed to serialize tags", e))?;
    let other_formats_json = serde_json::to_string(&book.other_formats)
        .map_err(|e| AppError::store("Failed to serialize other formats", e))?;

    sqlx::query(
        r#"
        INSERT INTO books (
            id, author, title, added, tags, filename,
            other_formats, series, series_index, description, read_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(book.id.as_string())
    .bind(&book.author)
    .bind(&book.title)
    .bind(book.added.as_seconds())
    .bind(tags_json)
    .bind(&book.filename)
    .bind(other_formats_json)
    .bind(&book.series)
    .bind(book.series_index)
    .bind(&book.description)
    .bind(&book.read)
    .execute(pool)
    .await
    .map_err(|e| AppError::store("Failed to insert book", e))?;

    Ok(())
}

/// Gets a book by ID
pub async fn get_book(pool: &DbPool, id: BookId) -> Result<Book, AppError> {
    let row = sqlx::query(
        r#"
        SELECT id, author, title, added, tags, filename,
               other_formats, series, series_index, description, read_at
        FROM books WHERE id = ?
        "#,
    )
    .bind(id.as_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::store("Failed to fetch book", e))?
    .ok_or_else(|| AppError::not_found("Book", id))?;

    row_to_book(row)
}

/// Overwrites an existing book record, matched by id.
/// Returns the number of affected rows (0 when the id is absent).
pub async fn update_book(pool: &DbPool, book: &Book) -> Result<u64, AppError> {
    let tags_json = serde_json::to_string(&book.tags)
        .map_err(|e| AppError::store("Failed to serialize tags", e))?;
    let other_formats_json = serde_json::to_string(&book.other_formats)
        .map_err(|e| AppError::store("Failed to serialize other formats", e))?;

    let result = sqlx::query(
        r#"
        UPDATE books SET
            author = ?, title = ?, added = ?, tags = ?, filename = ?,
            other_formats = ?, series = ?, series_index = ?, description = ?, read_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&book.author)
    .bind(&book.title)
    .bind(book.added.as_seconds())
    .bind(tags_json)
    .bind(&book.filename)
    .bind(other_formats_json)
    .bind(&book.series)
    .bind(book.series_index)
    .bind(&book.description)
    .bind(&book.read)
    .bind(book.id.as_string())
    .execute(pool)
    .await
    .map_err(|e| AppError::store("Failed to update book", e))?;

    Ok(result.rows_affected())
}

/// Deletes a book record. Returns the number of affected rows.
pub async fn delete_book(pool: &DbPool, id: BookId) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::store("Failed to delete book", e))?;

    Ok(result.rows_affected())
}

/// Lists all book records in store-insertion order
pub async fn list_books(pool: &DbPool) -> Result<Vec<Book>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, author, title, added, tags, filename,
               other_formats, series, series_index, description, read_at
        FROM books
        ORDER BY seq
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::store("Failed to list books", e))?;

    rows.into_iter().map(row_to_book).collect()
}

/// Counts all book records
pub async fn count_books(pool: &DbPool) -> Result<i64, AppError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::store("Failed to count books", e))
}

/// Converts a database row to a Book
pub(crate) fn row_to_book(row: sqlx::sqlite::SqliteRow) -> Result<Book, AppError> {
    use sqlx::Row;

    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::store("Missing book id", e))?;
    let id = BookId::from_string(&id_str).map_err(|e| AppError::store("Invalid book id", e))?;

    let tags_json: String = row
        .try_get("tags")
        .map_err(|e| AppError::store("Missing tags", e))?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| AppError::store("Failed to deserialize tags", e))?;

    let other_formats_json: String = row
        .try_get("other_formats")
        .map_err(|e| AppError::store("Missing other formats", e))?;
    let other_formats: Vec<String> = serde_json::from_str(&other_formats_json)
        .map_err(|e| AppError::store("Failed to deserialize other formats", e))?;

    let added_seconds: i64 = row
        .try_get("added")
        .map_err(|e| AppError::store("Missing added timestamp", e))?;

    Ok(Book {
        id,
        author: row
            .try_get("author")
            .map_err(|e| AppError::store("Missing author", e))?,
        title: row
            .try_get("title")
            .map_err(|e| AppError::store("Missing title", e))?,
        added: Timestamp::from_seconds(added_seconds),
        tags,
        filename: row.try_get("filename").ok().flatten(),
        other_formats,
        series: row.try_get("series").ok().flatten(),
        series_index: row.try_get("series_index").ok().flatten(),
        description: row.try_get("description").ok().flatten(),
        read: row.try_get("read_at").ok().flatten(),
    })
}
