//! Book catalog items and their authors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::ItemId;
use super::validation::{require_text, ValidationError};

/// A stored author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Author as submitted with a new book.
///
/// On the wire this is the loose `string | { name, image? }` union: a bare
/// string references an existing author, an object describes a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorInput {
    /// Existing author by identifier
    Reference(String),

    /// New author created alongside the book
    Inline {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
}

impl AuthorInput {
    /// Inline author with just a name
    pub fn named(name: impl Into<String>) -> Self {
        AuthorInput::Inline {
            name: name.into(),
            image: None,
        }
    }

    /// Reference to a stored author
    pub fn reference(id: impl Into<String>) -> Self {
        AuthorInput::Reference(id.into())
    }
}

/// Payload for creating a book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn10: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub authors: Vec<AuthorInput>,
}

impl NewBook {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: AuthorInput) -> Self {
        self.authors.push(author);
        self
    }

    /// Parse and validate a JSON payload
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let book: NewBook = serde_json::from_str(json)?;
        book.validate()?;
        Ok(book)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        for author in &self.authors {
            if let AuthorInput::Inline { name, .. } = author {
                require_text("authors[].name", name)?;
            }
        }
        Ok(())
    }
}

/// A stored book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: ItemId,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    pub isbn13: Option<i64>,
    pub isbn10: Option<i64>,
    pub release_year: Option<i32>,

    /// Linked authors in submission order
    pub authors: Vec<Author>,

    pub created_at: DateTime<Utc>,
}
