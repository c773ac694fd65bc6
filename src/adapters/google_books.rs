//! Google Books volume search.
//!
//! Endpoint: GET {base}/volumes?q=<term>&maxResults=<n>
//! Auth: optional `key` query parameter

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BookCatalog, ProviderError};
use crate::config::ProviderSettings;
use crate::domain::{AuthorInput, NewBook};

/// Google caps `maxResults` at 40
const MAX_RESULTS: usize = 40;

/// Google Books API client
pub struct GoogleBooksClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

/// Response from the volumes endpoint
#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<BookCandidate>,
}

/// One volume as returned by the search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCandidate {
    pub id: String,
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub industry_identifiers: Vec<IndustryIdentifier>,
    pub image_links: Option<ImageLinks>,
    pub published_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

impl BookCandidate {
    /// Numeric value of an industry identifier (`ISBN_13`, `ISBN_10`).
    ///
    /// Leading zeros are lost in the coercion; identifiers that are not all
    /// digits (an ISBN-10 ending in `X`) yield `None`.
    pub fn isbn(&self, kind: &str) -> Option<i64> {
        self.volume_info
            .industry_identifiers
            .iter()
            .find(|id| id.kind == kind)
            .and_then(|id| {
                let digits = id.identifier.trim();
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse::<i64>().ok()
            })
    }

    /// Year component of `publishedDate` (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`)
    pub fn release_year(&self) -> Option<i32> {
        let date = self.volume_info.published_date.as_deref()?;
        date.split('-').next()?.trim().parse::<i32>().ok()
    }

    /// Small cover for result lists
    pub fn thumbnail(&self) -> Option<&str> {
        self.volume_info
            .image_links
            .as_ref()
            .and_then(|links| links.small_thumbnail.as_deref())
    }

    /// Build the create payload for this volume.
    ///
    /// Provider author names are submitted as new inline authors.
    pub fn to_new_book(&self) -> NewBook {
        let info = &self.volume_info;
        NewBook {
            title: info.title.clone(),
            subtitle: info.subtitle.clone(),
            description: info.description.clone(),
            cover: info
                .image_links
                .as_ref()
                .and_then(|links| links.thumbnail.clone()),
            isbn13: self.isbn("ISBN_13"),
            isbn10: self.isbn("ISBN_10"),
            release_year: self.release_year(),
            authors: info.authors.iter().map(AuthorInput::named).collect(),
        }
    }
}

impl GoogleBooksClient {
    /// Create a new client
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            client,
        })
    }

    /// Create from config
    pub fn from_config(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Self::new(
            settings.google_books_url.clone(),
            settings.google_books_key.clone(),
            Duration::from_secs(settings.timeout_seconds),
        )
    }

    /// Build API URL
    fn api_url(&self) -> String {
        format!("{}/volumes", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl BookCatalog for GoogleBooksClient {
    fn name(&self) -> &str {
        "google-books"
    }

    async fn search_books(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<BookCandidate>, ProviderError> {
        let max_results = limit.clamp(1, MAX_RESULTS).to_string();
        let mut query = vec![("q", term), ("maxResults", max_results.as_str())];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        let response = self.client.get(self.api_url()).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: self.name().to_string(),
                message: format!("{}: {}", status, body.trim()),
            });
        }

        let mut volumes: VolumesResponse = response.json().await?;
        volumes.items.truncate(limit);
        debug!(term, count = volumes.items.len(), "Google Books search complete");

        Ok(volumes.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "kind": "books#volumes",
        "totalItems": 1,
        "items": [{
            "id": "vol-1",
            "volumeInfo": {
                "title": "Great Expectations",
                "subtitle": "Penguin Classics",
                "authors": ["Charles Dickens"],
                "industryIdentifiers": [
                    {"type": "ISBN_13", "identifier": "9780141439518"},
                    {"type": "ISBN_10", "identifier": "0141439513"}
                ],
                "imageLinks": {"thumbnail": "http://t/large", "smallThumbnail": "http://t/small"},
                "publishedDate": "2003-05-01",
                "description": "Pip's story"
            }
        }]
    }"#;

    fn sample() -> BookCandidate {
        let response: VolumesResponse = serde_json::from_str(SAMPLE).unwrap();
        response.items.into_iter().next().unwrap()
    }

    #[test]
    fn test_isbn_coercion_drops_leading_zero() {
        let candidate = sample();
        assert_eq!(candidate.isbn("ISBN_13"), Some(9780141439518));
        assert_eq!(candidate.isbn("ISBN_10"), Some(141439513));
        assert_eq!(candidate.isbn("ISSN"), None);
    }

    #[test]
    fn test_isbn_with_check_letter_is_dropped() {
        let mut candidate = sample();
        candidate.volume_info.industry_identifiers = vec![IndustryIdentifier {
            kind: "ISBN_10".to_string(),
            identifier: "080442957X".to_string(),
        }];
        assert_eq!(candidate.isbn("ISBN_10"), None);
    }

    #[test]
    fn test_release_year_from_partial_dates() {
        let mut candidate = sample();
        assert_eq!(candidate.release_year(), Some(2003));

        candidate.volume_info.published_date = Some("1861".to_string());
        assert_eq!(candidate.release_year(), Some(1861));

        candidate.volume_info.published_date = None;
        assert_eq!(candidate.release_year(), None);
    }

    #[test]
    fn test_to_new_book() {
        let book = sample().to_new_book();

        assert_eq!(book.title, "Great Expectations");
        assert_eq!(book.subtitle.as_deref(), Some("Penguin Classics"));
        assert_eq!(book.cover.as_deref(), Some("http://t/large"));
        assert_eq!(book.isbn13, Some(9780141439518));
        assert_eq!(book.isbn10, Some(141439513));
        assert_eq!(book.release_year, Some(2003));
        assert_eq!(book.authors, vec![AuthorInput::named("Charles Dickens")]);
    }

    #[test]
    fn test_missing_items_is_empty() {
        let response: VolumesResponse =
            serde_json::from_str(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_api_url() {
        let client = GoogleBooksClient::new(
            "https://www.googleapis.com/books/v1/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.api_url(),
            "https://www.googleapis.com/books/v1/volumes"
        );
    }
}
