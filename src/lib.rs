//! rewa - personal read/watch list
//!
//! Search external book and video catalogs, add results to a persisted
//! "want to read/watch" list, and browse that list.
//!
//! # Architecture
//!
//! Selecting a search result runs a two-step ingestion:
//! - Create the catalog item (authors reconciled, fields extracted)
//! - Add it to the caller's list
//!
//! The steps are not one transaction; a policy decides what happens to the
//! created item when the second step fails.
//!
//! # Modules
//!
//! - `adapters`: External catalogs (Google Books, IMDB)
//! - `core`: Operation handlers (search, ingest) and the `Services` context
//! - `domain`: Data structures (Book, Video, ListEntry)
//! - `library`: Persistence (`LibraryStore`, SQLite)
//! - `widget`: Debounced search session and cached list view
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Search both catalogs
//! rewa search "great expectations"
//!
//! # Add the first video result to the list
//! rewa add video heat --pick 0
//!
//! # Show the list
//! rewa list
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;
pub mod widget;

// Re-export main types at crate root for convenience
pub use self::core::{IngestError, IngestOutcome, NewItem, SearchResults, Services};
pub use domain::{AuthorInput, Book, Category, ItemId, ListEntry, NewBook, NewVideo, Video};
pub use library::{LibraryStore, SqliteLibrary, StoreError};
pub use widget::{SearchSession, Selection};
