//! Catalog ingestion: create mutations, list membership, and the
//! create-then-link sequence run when a search result is picked.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{
    AuthorInput, Book, Category, ItemId, ListEntry, NewBook, NewVideo, ValidationError, Video,
};
use crate::library::{AuthorLink, LibraryStore, StoreError};

/// Errors that can occur while ingesting an item
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Author not found: {0}")]
    AuthorNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Created {category} {item_id} but could not add it to the list (compensated: {compensated}): {source}")]
    LinkFailed {
        item_id: ItemId,
        category: Category,
        compensated: bool,
        source: StoreError,
    },
}

/// What to do with an author reference that matches no stored author
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedAuthorPolicy {
    /// Drop the reference and carry on
    #[default]
    Skip,

    /// Fail the create with `AuthorNotFound`
    Reject,
}

/// What to do when the item was created but the list insert failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkFailurePolicy {
    /// Leave the created item in the catalog without a list entry
    #[default]
    KeepOrphan,

    /// Delete the created item again
    Compensate,
}

/// A create payload for either catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewItem {
    Book(NewBook),
    Video(NewVideo),
}

impl NewItem {
    pub fn category(&self) -> Category {
        match self {
            NewItem::Book(_) => Category::Book,
            NewItem::Video(_) => Category::Video,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            NewItem::Book(book) => &book.title,
            NewItem::Video(video) => &video.title,
        }
    }
}

/// Result of a successful create-then-link sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub item_id: ItemId,
    pub category: Category,
    pub entry: ListEntry,
}

/// Turn submitted authors into links, in submission order
pub fn reconcile_authors(
    store: &dyn LibraryStore,
    authors: &[AuthorInput],
    policy: UnresolvedAuthorPolicy,
) -> Result<Vec<AuthorLink>, IngestError> {
    let mut links = Vec::with_capacity(authors.len());

    for author in authors {
        match author {
            AuthorInput::Reference(id) => match store.find_author(id)? {
                Some(existing) => links.push(AuthorLink::Existing(existing)),
                None => match policy {
                    UnresolvedAuthorPolicy::Skip => {
                        debug!(author_id = %id, "Skipping unknown author reference");
                    }
                    UnresolvedAuthorPolicy::Reject => {
                        return Err(IngestError::AuthorNotFound(id.clone()));
                    }
                },
            },
            AuthorInput::Inline { name, image } => links.push(AuthorLink::New {
                name: name.clone(),
                image: image.clone(),
            }),
        }
    }

    Ok(links)
}

/// Create a book, linking or creating its authors in the same write
#[instrument(skip(store, payload), fields(title = %payload.title))]
pub fn create_book(
    store: &dyn LibraryStore,
    payload: NewBook,
    policy: UnresolvedAuthorPolicy,
) -> Result<Book, IngestError> {
    payload.validate()?;

    let links = reconcile_authors(store, &payload.authors, policy)?;
    let book = store.insert_book(&payload, &links)?;

    info!(book_id = %book.id, authors = book.authors.len(), "Book created");
    Ok(book)
}

/// Create a video, deriving the release year from the description if unset
#[instrument(skip(store, payload), fields(title = %payload.title))]
pub fn create_video(store: &dyn LibraryStore, mut payload: NewVideo) -> Result<Video, IngestError> {
    payload.validate()?;

    payload.release_year = payload.resolved_release_year();
    let video = store.insert_video(&payload)?;

    info!(video_id = %video.id, release_year = ?video.release_year, "Video created");
    Ok(video)
}

/// Put an existing catalog item on the user's list.
///
/// Not deduplicated: adding the same item twice yields two entries.
pub fn add_to_list(
    store: &dyn LibraryStore,
    user_id: &str,
    item_id: &ItemId,
    category: Category,
) -> Result<ListEntry, StoreError> {
    let entry = store.add_list_entry(user_id, item_id, category)?;
    info!(%item_id, %category, "Added to list");
    Ok(entry)
}

/// Create an item, then add it to the user's list.
///
/// The two steps are not one transaction. If the list insert fails the
/// created item is kept or removed according to `on_link_failure`; nothing
/// is retried.
#[instrument(skip(store, item), fields(category = %item.category(), title = %item.title()))]
pub fn ingest(
    store: &dyn LibraryStore,
    user_id: &str,
    item: NewItem,
    authors: UnresolvedAuthorPolicy,
    on_link_failure: LinkFailurePolicy,
) -> Result<IngestOutcome, IngestError> {
    let category = item.category();
    let item_id = match item {
        NewItem::Book(book) => create_book(store, book, authors)?.id,
        NewItem::Video(video) => create_video(store, video)?.id,
    };

    match add_to_list(store, user_id, &item_id, category) {
        Ok(entry) => Ok(IngestOutcome {
            item_id,
            category,
            entry,
        }),
        Err(source) => {
            let compensated = match on_link_failure {
                LinkFailurePolicy::KeepOrphan => {
                    warn!(%item_id, error = %source, "List insert failed, item left without entry");
                    false
                }
                LinkFailurePolicy::Compensate => match store.delete_item(&item_id, category) {
                    Ok(deleted) => {
                        warn!(%item_id, error = %source, "List insert failed, created item removed");
                        deleted
                    }
                    Err(e) => {
                        error!(%item_id, error = %e, "Compensating delete failed");
                        false
                    }
                },
            };

            Err(IngestError::LinkFailed {
                item_id,
                category,
                compensated,
                source,
            })
        }
    }
}
