//! IMDB-style advanced title search.
//!
//! Endpoint: GET {base}/API/AdvancedSearch/{key}?title=<term>
//! Auth: API key in the path

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProviderError, VideoCatalog};
use crate::config::ProviderSettings;
use crate::domain::{extract_release_year, NewVideo};

/// IMDB API client
pub struct ImdbClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

/// Response from the advanced search endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<VideoCandidate>>,
    #[serde(default)]
    error_message: Option<String>,
}

/// One title as returned by the search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCandidate {
    pub id: String,
    #[serde(default)]
    pub title: String,

    /// Short descriptor, usually the year in parentheses
    #[serde(default)]
    pub description: String,

    pub image: Option<String>,
    pub plot: Option<String>,

    /// Display string, e.g. "Action, Crime"
    pub genres: Option<String>,

    /// Display string, e.g. "Al Pacino, Robert De Niro"
    pub stars: Option<String>,

    #[serde(default)]
    pub star_list: Option<Vec<Star>>,
    #[serde(default)]
    pub genre_list: Option<Vec<Genre>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub key: Option<String>,
    pub value: String,
}

impl VideoCandidate {
    /// Year from the short description, falling back to the plot
    pub fn release_year(&self) -> Option<i32> {
        extract_release_year(&self.description)
            .or_else(|| self.plot.as_deref().and_then(extract_release_year))
    }

    pub fn cast_names(&self) -> Vec<String> {
        self.star_list
            .iter()
            .flatten()
            .map(|star| star.name.clone())
            .collect()
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genre_list
            .iter()
            .flatten()
            .map(|genre| genre.value.clone())
            .collect()
    }

    /// Build the create payload for this title
    pub fn to_new_video(&self) -> NewVideo {
        NewVideo {
            title: self.title.clone(),
            description: self.plot.clone(),
            image: self.image.clone(),
            cast_members: self.cast_names(),
            genres: self.genre_names(),
            release_year: self.release_year(),
        }
    }
}

impl ImdbClient {
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
            settings.imdb_url.clone(),
            settings.imdb_key.clone(),
            Duration::from_secs(settings.timeout_seconds),
        )
    }

    /// Build API URL
    fn api_url(&self, key: &str) -> String {
        format!(
            "{}/API/AdvancedSearch/{}",
            self.base_url.trim_end_matches('/'),
            key
        )
    }
}

#[async_trait]
impl VideoCatalog for ImdbClient {
    fn name(&self) -> &str {
        "imdb"
    }

    async fn search_videos(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<VideoCandidate>, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("IMDB_API_KEY".to_string()))?;

        let response = self
            .client
            .get(self.api_url(key))
            .query(&[("title", term)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                provider: self.name().to_string(),
                message: status.to_string(),
            });
        }

        let body: SearchResponse = response.json().await?;
        let mut results = body.results.unwrap_or_default();

        // The API reports failures in-band with a 200
        if results.is_empty() {
            if let Some(message) = body.error_message.filter(|m| !m.trim().is_empty()) {
                return Err(ProviderError::Api {
                    provider: self.name().to_string(),
                    message,
                });
            }
        }

        results.truncate(limit);
        debug!(term, count = results.len(), "IMDB search complete");

        Ok(results)
    }
}
