//! Ingestion tests
//!
//! Create mutations, list membership, and the create-then-link sequence
//! against a real SQLite store.

mod common;

use std::sync::Arc;

use common::{
    book_candidate, memory_store, services_with, video_candidate, DroppingLinkStore, FakeBooks,
    FakeVideos,
};
use rewa::config::IngestSettings;
use rewa::core::{LinkFailurePolicy, UnresolvedAuthorPolicy};
use rewa::domain::{AuthorInput, Category, ItemId, ListItem, NewBook, NewVideo};
use rewa::library::{LibraryStore, SqliteLibrary, StoreError};
use rewa::{IngestError, NewItem, Services};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn services() -> Services {
    services_with(
        memory_store(),
        Arc::new(FakeBooks::new(Vec::new())),
        Arc::new(FakeVideos::new(Vec::new())),
    )
}

fn dropping_services(policy: LinkFailurePolicy) -> Services {
    let store = DroppingLinkStore {
        inner: SqliteLibrary::open_in_memory().unwrap(),
    };
    services_with(
        Arc::new(store),
        Arc::new(FakeBooks::new(Vec::new())),
        Arc::new(FakeVideos::new(Vec::new())),
    )
    .with_ingest_settings(IngestSettings {
        link_failure: policy,
        ..IngestSettings::default()
    })
}

#[test]
fn test_create_then_add_appears_in_list() {
    let services = services();

    let book = assert_ok!(services.create_book(
        NewBook::new("Great Expectations").with_author(AuthorInput::named("Charles Dickens"))
    ));
    let entry = assert_ok!(services.add_to_list(&book.id, Category::Book));

    let list = services.get_list().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0], entry);
    assert_eq!(list[0].item_id, book.id);
    assert_eq!(list[0].category, Category::Book);
    assert_eq!(list[0].user_id, "ada");
}

#[test]
fn test_existing_authors_linked_new_authors_created() {
    let services = services();

    let first = services
        .create_book(NewBook::new("Bleak House").with_author(AuthorInput::named("Charles Dickens")))
        .unwrap();
    let dickens = first.authors[0].clone();

    let book = services
        .create_book(
            NewBook::new("Our Mutual Friend")
                .with_author(AuthorInput::reference(dickens.id.clone()))
                .with_author(AuthorInput::named("Marcus Stone")),
        )
        .unwrap();

    let names: Vec<_> = book.authors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Charles Dickens", "Marcus Stone"]);
    assert_eq!(book.authors[0].id, dickens.id, "existing author is reused");
    assert_ne!(book.authors[1].id, dickens.id);

    let stored = services.store().get_book(&book.id).unwrap().unwrap();
    assert_eq!(stored.authors, book.authors);
}

#[test]
fn test_unknown_author_reference_skipped_by_default() {
    let services = services();

    let book = services
        .create_book(
            NewBook::new("Hard Times")
                .with_author(AuthorInput::reference("no-such-author"))
                .with_author(AuthorInput::named("Charles Dickens")),
        )
        .unwrap();

    assert_eq!(book.authors.len(), 1);
    assert_eq!(book.authors[0].name, "Charles Dickens");
}

#[test]
fn test_unknown_author_reference_rejected_when_configured() {
    let services = services().with_ingest_settings(IngestSettings {
        unresolved_authors: UnresolvedAuthorPolicy::Reject,
        ..IngestSettings::default()
    });

    let err = services
        .create_book(NewBook::new("Hard Times").with_author(AuthorInput::reference("ghost")))
        .unwrap_err();

    assert!(matches!(err, IngestError::AuthorNotFound(ref id) if id == "ghost"));
    assert!(services.get_list().unwrap().is_empty());
}

#[test]
fn test_create_video_derives_year_from_description() {
    let services = services();

    let video = services
        .create_video(NewVideo::new("Heat").with_description("(1995) Crime thriller"))
        .unwrap();

    assert_eq!(video.release_year, Some(1995));
}

#[test]
fn test_blank_title_rejected() {
    let services = services();

    assert!(matches!(
        services.create_book(NewBook::new("  ")),
        Err(IngestError::Validation(_))
    ));
    assert!(matches!(
        services.create_video(NewVideo::new("")),
        Err(IngestError::Validation(_))
    ));
}

#[test]
fn test_add_unknown_item_fails() {
    let services = services();
    let missing = ItemId::from("does-not-exist");

    let err = assert_err!(services.add_to_list(&missing, Category::Video));

    match err {
        StoreError::MissingItem { id, category } => {
            assert_eq!(id, missing);
            assert_eq!(category, Category::Video);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(services.get_list().unwrap().is_empty());
}

#[test]
fn test_ingest_selected_candidates() {
    let services = services();

    let book = services
        .ingest(NewItem::Book(book_candidate("b1", "Great Expectations").to_new_book()))
        .unwrap();
    let video = services
        .ingest(NewItem::Video(
            video_candidate("tt1", "Great Expectations", "(1946)").to_new_video(),
        ))
        .unwrap();

    let items = services.get_list_items().unwrap();
    assert_eq!(items.len(), 2);

    match &items[0].1 {
        ListItem::Book(stored) => {
            assert_eq!(stored.id, book.item_id);
            assert_eq!(stored.isbn13, Some(9780141439518));
            assert_eq!(stored.isbn10, Some(141439513));
            assert_eq!(stored.release_year, Some(2003));
            assert_eq!(stored.authors[0].name, "Charles Dickens");
        }
        other => panic!("expected book, got {:?}", other),
    }
    match &items[1].1 {
        ListItem::Video(stored) => {
            assert_eq!(stored.id, video.item_id);
            assert_eq!(stored.release_year, Some(1946));
        }
        other => panic!("expected video, got {:?}", other),
    }
}

#[test]
fn test_link_failure_keeps_orphan_by_default() {
    let services = dropping_services(LinkFailurePolicy::KeepOrphan);

    let err = services
        .ingest(NewItem::Book(NewBook::new("Little Dorrit")))
        .unwrap_err();

    let item_id = match err {
        IngestError::LinkFailed {
            item_id,
            category,
            compensated,
            ..
        } => {
            assert_eq!(category, Category::Book);
            assert!(!compensated);
            item_id
        }
        other => panic!("unexpected error: {}", other),
    };

    assert!(services.store().get_book(&item_id).unwrap().is_some());
    assert!(services.get_list().unwrap().is_empty());
}

#[test]
fn test_link_failure_compensates_when_configured() {
    let services = dropping_services(LinkFailurePolicy::Compensate);

    let err = services
        .ingest(NewItem::Video(NewVideo::new("Heat")))
        .unwrap_err();

    let item_id = match err {
        IngestError::LinkFailed {
            item_id,
            compensated,
            ..
        } => {
            assert!(compensated);
            item_id
        }
        other => panic!("unexpected error: {}", other),
    };

    assert!(services.store().get_video(&item_id).unwrap().is_none());
    assert!(services.get_list().unwrap().is_empty());
}

#[test]
fn test_list_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("library").join("rewa.db");

    let item_id = {
        let store = Arc::new(SqliteLibrary::open(&path).unwrap());
        let services = services_with(
            store,
            Arc::new(FakeBooks::new(Vec::new())),
            Arc::new(FakeVideos::new(Vec::new())),
        );
        services
            .ingest(NewItem::Video(NewVideo::new("Ran").with_description("(1985)")))
            .unwrap()
            .item_id
    };

    let store = SqliteLibrary::open(&path).unwrap();
    let entries = store.list_entries("ada").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].item_id, item_id);
    assert_eq!(
        store.get_video(&item_id).unwrap().unwrap().release_year,
        Some(1985)
    );
}
