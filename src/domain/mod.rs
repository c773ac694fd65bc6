//! Domain types for rewa.
//!
//! This module contains the core data structures:
//! - Item: identifiers and categories
//! - Book/Video: catalog items and their create payloads
//! - List: want-list entries

pub mod book;
pub mod item;
pub mod list;
pub mod validation;
pub mod video;

// Re-export commonly used types
pub use book::{Author, AuthorInput, Book, NewBook};
pub use item::{Category, ItemId};
pub use list::{ListEntry, ListItem};
pub use validation::ValidationError;
pub use video::{extract_release_year, NewVideo, Video};
