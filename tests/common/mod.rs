//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rewa::adapters::{
    BookCandidate, BookCatalog, IndustryIdentifier, ProviderError, VideoCandidate, VideoCatalog,
    VolumeInfo,
};
use rewa::domain::{Author, Book, Category, ItemId, ListEntry, NewBook, NewVideo, Video};
use rewa::library::{AuthorLink, LibraryStore, SqliteLibrary, StoreError};
use rewa::Services;

/// Book catalog returning canned results (or an error)
pub struct FakeBooks {
    pub results: Vec<BookCandidate>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeBooks {
    pub fn new(results: Vec<BookCandidate>) -> Self {
        Self {
            results,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookCatalog for FakeBooks {
    fn name(&self) -> &str {
        "fake-books"
    }

    async fn search_books(
        &self,
        _term: &str,
        limit: usize,
    ) -> Result<Vec<BookCandidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Api {
                provider: "fake-books".to_string(),
                message: "503 Service Unavailable".to_string(),
            });
        }
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

/// Video catalog returning canned results (or an error)
pub struct FakeVideos {
    pub results: Vec<VideoCandidate>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeVideos {
    pub fn new(results: Vec<VideoCandidate>) -> Self {
        Self {
            results,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoCatalog for FakeVideos {
    fn name(&self) -> &str {
        "fake-videos"
    }

    async fn search_videos(
        &self,
        _term: &str,
        _limit: usize,
    ) -> Result<Vec<VideoCandidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::NotConfigured("IMDB_API_KEY".to_string()));
        }
        // Ignores the limit on purpose, like a provider that over-delivers
        Ok(self.results.clone())
    }
}

/// Store whose list inserts fail, as if the connection dropped
pub struct DroppingLinkStore {
    pub inner: SqliteLibrary,
}

impl LibraryStore for DroppingLinkStore {
    fn find_author(&self, id: &str) -> Result<Option<Author>, StoreError> {
        self.inner.find_author(id)
    }

    fn insert_book(&self, book: &NewBook, authors: &[AuthorLink]) -> Result<Book, StoreError> {
        self.inner.insert_book(book, authors)
    }

    fn insert_video(&self, video: &NewVideo) -> Result<Video, StoreError> {
        self.inner.insert_video(video)
    }

    fn get_book(&self, id: &ItemId) -> Result<Option<Book>, StoreError> {
        self.inner.get_book(id)
    }

    fn get_video(&self, id: &ItemId) -> Result<Option<Video>, StoreError> {
        self.inner.get_video(id)
    }

    fn delete_item(&self, id: &ItemId, category: Category) -> Result<bool, StoreError> {
        self.inner.delete_item(id, category)
    }

    fn add_list_entry(
        &self,
        _user_id: &str,
        _item_id: &ItemId,
        _category: Category,
    ) -> Result<ListEntry, StoreError> {
        Err(StoreError::Unavailable("simulated network drop".to_string()))
    }

    fn list_entries(&self, user_id: &str) -> Result<Vec<ListEntry>, StoreError> {
        self.inner.list_entries(user_id)
    }
}

pub fn book_candidate(id: &str, title: &str) -> BookCandidate {
    BookCandidate {
        id: id.to_string(),
        volume_info: VolumeInfo {
            title: title.to_string(),
            authors: vec!["Charles Dickens".to_string()],
            industry_identifiers: vec![
                IndustryIdentifier {
                    kind: "ISBN_13".to_string(),
                    identifier: "9780141439518".to_string(),
                },
                IndustryIdentifier {
                    kind: "ISBN_10".to_string(),
                    identifier: "0141439513".to_string(),
                },
            ],
            published_date: Some("2003-05-01".to_string()),
            ..Default::default()
        },
    }
}

pub fn video_candidate(id: &str, title: &str, description: &str) -> VideoCandidate {
    VideoCandidate {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        plot: Some(format!("The plot of {}", title)),
        ..Default::default()
    }
}

/// Services over an in-memory store and the given catalogs
pub fn services_with(
    store: Arc<dyn LibraryStore>,
    books: Arc<FakeBooks>,
    videos: Arc<FakeVideos>,
) -> Services {
    Services::new(store, books, videos, "ada")
}

pub fn memory_store() -> Arc<SqliteLibrary> {
    Arc::new(SqliteLibrary::open_in_memory().unwrap())
}
