//! Bookden domain types and error taxonomy
//!
//! This crate holds the shared vocabulary of the library manager: the book
//! record, its identifier and timestamp newtypes, tag normalization, and the
//! central error type consumed by every other crate.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, Result};
pub use types::{dedup_tags, normalize_tags, Book, BookId, BookPatch, Timestamp, Validator};
