//! Persistent library of catalog items and want-list entries.
//!
//! Handlers never reach for a global connection: they receive a
//! `LibraryStore` and call it explicitly.
//!
//! # Tables
//!
//! ```text
//! authors        id, name, image
//! books          id, title, subtitle, description, cover, isbn13, isbn10, release_year
//! book_authors   book_id → books, author_id → authors, position
//! videos         id, title, description, image, cast_members (json), genres (json), release_year
//! list_entries   id, user_id, book_id → books | video_id → videos, category
//! ```

pub mod sqlite;

use thiserror::Error;

use crate::domain::{Author, Book, Category, ItemId, ListEntry, NewBook, NewVideo, Video};

pub use sqlite::SqliteLibrary;

/// Errors that can occur in the library store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No {category} with id {id}")]
    MissingItem { id: ItemId, category: Category },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A reconciled author for a new book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorLink {
    /// Link a stored author as-is
    Existing(Author),

    /// Create the author together with the book
    New { name: String, image: Option<String> },
}

/// Data access used by every operation handler
pub trait LibraryStore: Send + Sync {
    /// Look up an author by identifier
    fn find_author(&self, id: &str) -> Result<Option<Author>, StoreError>;

    /// Insert a book and its authors in one transaction.
    ///
    /// `authors` is the reconciled list; the payload's own `authors` field is
    /// ignored.
    fn insert_book(&self, book: &NewBook, authors: &[AuthorLink]) -> Result<Book, StoreError>;

    /// Insert a video exactly as given
    fn insert_video(&self, video: &NewVideo) -> Result<Video, StoreError>;

    fn get_book(&self, id: &ItemId) -> Result<Option<Book>, StoreError>;

    fn get_video(&self, id: &ItemId) -> Result<Option<Video>, StoreError>;

    /// Remove a catalog item; returns whether anything was deleted
    fn delete_item(&self, id: &ItemId, category: Category) -> Result<bool, StoreError>;

    /// Put an existing catalog item on a user's list
    fn add_list_entry(
        &self,
        user_id: &str,
        item_id: &ItemId,
        category: Category,
    ) -> Result<ListEntry, StoreError>;

    /// A user's list, oldest entry first
    fn list_entries(&self, user_id: &str) -> Result<Vec<ListEntry>, StoreError>;
}
