//! Want-list entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::book::Book;
use super::item::{Category, ItemId};
use super::video::Video;

/// One item on a user's read/watch list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    pub id: String,
    pub user_id: String,
    pub item_id: ItemId,
    pub category: Category,
    pub added_at: DateTime<Utc>,
}

/// A list entry together with the catalog item it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "item", rename_all = "snake_case")]
pub enum ListItem {
    Book(Book),
    Video(Video),
}

impl ListItem {
    pub fn title(&self) -> &str {
        match self {
            ListItem::Book(book) => &book.title,
            ListItem::Video(video) => &video.title,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ListItem::Book(_) => Category::Book,
            ListItem::Video(_) => Category::Video,
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        match self {
            ListItem::Book(book) => book.release_year,
            ListItem::Video(video) => video.release_year,
        }
    }
}
