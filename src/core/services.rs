//! The handler context: every operation the client can invoke, with its
//! collaborators injected rather than looked up globally.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::instrument;

use super::ingest::{self, IngestError, IngestOutcome, NewItem};
use super::search::{SearchAggregator, SearchResults};
use crate::adapters::{BookCatalog, GoogleBooksClient, ImdbClient, VideoCatalog};
use crate::config::{IngestSettings, ResolvedConfig, SearchSettings};
use crate::domain::{Book, Category, ItemId, ListEntry, ListItem, NewBook, NewVideo, Video};
use crate::library::{LibraryStore, SqliteLibrary, StoreError};

/// Operations available to one authenticated caller
#[derive(Clone)]
pub struct Services {
    store: Arc<dyn LibraryStore>,
    search: SearchAggregator,
    user_id: String,
    ingest: IngestSettings,
}

impl Services {
    /// Wire services from explicit collaborators with default settings
    pub fn new(
        store: Arc<dyn LibraryStore>,
        books: Arc<dyn BookCatalog>,
        videos: Arc<dyn VideoCatalog>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            search: SearchAggregator::new(books, videos, SearchSettings::default()),
            user_id: user_id.into(),
            ingest: IngestSettings::default(),
        }
    }

    /// Open the configured database and HTTP catalogs
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let store = SqliteLibrary::open(&config.database).with_context(|| {
            format!("Failed to open library database: {}", config.database.display())
        })?;
        let books = GoogleBooksClient::from_config(&config.providers)
            .context("Failed to build Google Books client")?;
        let videos =
            ImdbClient::from_config(&config.providers).context("Failed to build IMDB client")?;

        Ok(Self::new(
            Arc::new(store),
            Arc::new(books),
            Arc::new(videos),
            config.user.clone(),
        )
        .with_search_settings(config.search)
        .with_ingest_settings(config.ingest))
    }

    pub fn with_search_settings(mut self, settings: SearchSettings) -> Self {
        self.search = self.search.with_settings(settings);
        self
    }

    pub fn with_ingest_settings(mut self, settings: IngestSettings) -> Self {
        self.ingest = settings;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn search_settings(&self) -> &SearchSettings {
        self.search.settings()
    }

    pub fn ingest_settings(&self) -> &IngestSettings {
        &self.ingest
    }

    pub fn store(&self) -> &dyn LibraryStore {
        self.store.as_ref()
    }

    /// `search.searchItem`
    pub async fn search(&self, term: &str) -> SearchResults {
        self.search.search(term).await
    }

    /// `book.create`
    pub fn create_book(&self, payload: NewBook) -> Result<Book, IngestError> {
        ingest::create_book(self.store(), payload, self.ingest.unresolved_authors)
    }

    /// `video.create`
    pub fn create_video(&self, payload: NewVideo) -> Result<Video, IngestError> {
        ingest::create_video(self.store(), payload)
    }

    /// `reWaList.addToReWaList`
    pub fn add_to_list(&self, item_id: &ItemId, category: Category) -> Result<ListEntry, StoreError> {
        ingest::add_to_list(self.store(), &self.user_id, item_id, category)
    }

    /// `reWaList.getReWaList`
    pub fn get_list(&self) -> Result<Vec<ListEntry>, StoreError> {
        self.store.list_entries(&self.user_id)
    }

    /// The list with each entry resolved to its catalog item
    #[instrument(skip(self), fields(user = %self.user_id))]
    pub fn get_list_items(&self) -> Result<Vec<(ListEntry, ListItem)>, StoreError> {
        let mut items = Vec::new();
        for entry in self.get_list()? {
            let item = match entry.category {
                Category::Book => self.store.get_book(&entry.item_id)?.map(ListItem::Book),
                Category::Video => self.store.get_video(&entry.item_id)?.map(ListItem::Video),
            };
            match item {
                Some(item) => items.push((entry, item)),
                None => {
                    return Err(StoreError::MissingItem {
                        id: entry.item_id,
                        category: entry.category,
                    })
                }
            }
        }
        Ok(items)
    }

    /// Create an item and add it to the caller's list
    pub fn ingest(&self, item: NewItem) -> Result<IngestOutcome, IngestError> {
        ingest::ingest(
            self.store(),
            &self.user_id,
            item,
            self.ingest.unresolved_authors,
            self.ingest.link_failure,
        )
    }
}
