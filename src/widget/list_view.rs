//! Cached view of the caller's list.
//!
//! Mutations invalidate the cache instead of patching it; the next read
//! refetches the whole list.

use crate::core::Services;
use crate::domain::ListEntry;
use crate::library::StoreError;

#[derive(Debug, Default)]
pub struct ListView {
    entries: Option<Vec<ListEntry>>,
    fetches: usize,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entries, refetched if invalidated
    pub fn entries(&mut self, services: &Services) -> Result<&[ListEntry], StoreError> {
        if self.entries.is_none() {
            self.entries = Some(services.get_list()?);
            self.fetches += 1;
        }
        Ok(self.entries.as_deref().unwrap_or_default())
    }

    pub fn invalidate(&mut self) {
        self.entries = None;
    }

    pub fn is_stale(&self) -> bool {
        self.entries.is_none()
    }

    /// How many times the list has been fetched
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }
}
