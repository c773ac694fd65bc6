//! Adapter interfaces for external catalogs.
//!
//! Each catalog sits behind its own trait so the search aggregator and tests
//! can swap the HTTP clients for anything that returns candidates.

pub mod google_books;
pub mod imdb;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the concrete clients and their candidate shapes
pub use google_books::{BookCandidate, GoogleBooksClient, IndustryIdentifier, VolumeInfo};
pub use imdb::{ImdbClient, VideoCandidate};

/// Errors raised by an external catalog
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    #[error("{0} is not configured")]
    NotConfigured(String),
}

/// A searchable book catalog
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Free-text search, provider ordering, at most `limit` results
    async fn search_books(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<BookCandidate>, ProviderError>;
}

/// A searchable video catalog
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Free-text search, provider ordering, at most `limit` results
    async fn search_videos(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<VideoCandidate>, ProviderError>;
}
