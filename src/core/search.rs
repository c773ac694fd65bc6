//! Search aggregation across the book and video catalogs.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::adapters::{BookCatalog, BookCandidate, VideoCandidate, VideoCatalog};
use crate::config::SearchSettings;

/// Results of one aggregated search, keyed by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub books: Vec<BookCandidate>,
    pub videos: Vec<VideoCandidate>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.videos.is_empty()
    }
}

/// Fans a term out to both catalogs
#[derive(Clone)]
pub struct SearchAggregator {
    books: Arc<dyn BookCatalog>,
    videos: Arc<dyn VideoCatalog>,
    settings: SearchSettings,
}

impl SearchAggregator {
    pub fn new(
        books: Arc<dyn BookCatalog>,
        videos: Arc<dyn VideoCatalog>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            books,
            videos,
            settings,
        }
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Query both catalogs concurrently.
    ///
    /// A blank term returns empty results without calling either catalog.
    /// A failing catalog is logged and contributes an empty list; it never
    /// hides the other catalog's results.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str) -> SearchResults {
        let term = term.trim();
        if term.is_empty() {
            return SearchResults::default();
        }

        let (books, videos) = tokio::join!(
            self.books.search_books(term, self.settings.book_limit),
            self.videos.search_videos(term, self.settings.video_limit),
        );

        let mut books = books.unwrap_or_else(|e| {
            warn!(provider = self.books.name(), error = %e, "Book search failed");
            Vec::new()
        });
        let mut videos = videos.unwrap_or_else(|e| {
            warn!(provider = self.videos.name(), error = %e, "Video search failed");
            Vec::new()
        });

        // Providers may ignore the requested limit
        books.truncate(self.settings.book_limit);
        videos.truncate(self.settings.video_limit);

        debug!(books = books.len(), videos = videos.len(), "Search complete");
        SearchResults { books, videos }
    }
}
