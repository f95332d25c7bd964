//! Domain types for Bookden
//!
//! - `book`: the book record, its identifier, patch type, and tag helpers
//! - `common`: shared timestamp newtype and validation trait

mod book;
mod common;

pub use book::{dedup_tags, normalize_tags, Book, BookId, BookPatch};
pub use common::{Timestamp, Validator};
