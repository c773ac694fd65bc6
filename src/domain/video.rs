//! Video catalog items.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::item::ItemId;
use super::validation::{require_text, ValidationError};

static YEAR_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Pull a release year out of free text.
///
/// Takes the first `19xx`/`20xx` run of digits anywhere in the text. This is
/// a heuristic: a title such as "1984" parses as a year.
pub fn extract_release_year(text: &str) -> Option<i32> {
    let pattern = YEAR_PATTERN.get_or_init(|| {
        Regex::new(r"(19|20)\d{2}").expect("year pattern is a valid regex")
    });

    pattern
        .find(text)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Payload for creating a video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub cast_members: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
}

impl NewVideo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse and validate a JSON payload
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let video: NewVideo = serde_json::from_str(json)?;
        video.validate()?;
        Ok(video)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }

    /// Explicit release year, else one scanned from the description
    pub fn resolved_release_year(&self) -> Option<i32> {
        self.release_year.or_else(|| {
            self.description
                .as_deref()
                .and_then(extract_release_year)
        })
    }
}

/// A stored video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub cast_members: Vec<String>,
    pub genres: Vec<String>,
    pub release_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}
