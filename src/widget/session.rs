//! Search session: the search box and its two result columns as a state
//! machine, independent of any UI toolkit.
//!
//! ```text
//! Idle ──input──▶ Typing ──poll (window elapsed)──▶ Querying ──complete──▶ ResultsShown
//!   ▲                                                                          │
//!   └──────────────── select (create → link → invalidate list) ◀──────────────┘
//! ```

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use super::debounce::Debouncer;
use super::list_view::ListView;
use crate::core::{IngestError, IngestOutcome, NewItem, SearchResults, Services};
use crate::domain::Category;

/// Errors surfaced by a selection
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No {category} result at position {index}")]
    NoSuchResult { category: Category, index: usize },

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Typing,
    Querying,
    ResultsShown,
    Selecting,
}

/// A committed search term and the key that identifies it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub key: u64,
    pub term: String,
}

/// A result picked from one of the columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Book(usize),
    Video(usize),
}

pub struct SearchSession {
    services: Services,
    debouncer: Debouncer<String>,
    state: SessionState,
    term: String,
    query_key: u64,
    results: SearchResults,
    list_view: ListView,
}

impl SearchSession {
    pub fn new(services: Services) -> Self {
        let window = Duration::from_millis(services.search_settings().debounce_ms);
        Self {
            services,
            debouncer: Debouncer::new(window),
            state: SessionState::Idle,
            term: String::new(),
            query_key: 0,
            results: SearchResults::default(),
            list_view: ListView::new(),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The committed search term
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    pub fn list_view(&mut self) -> &mut ListView {
        &mut self.list_view
    }

    /// When the pending keystroke settles
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Record the input's current value
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.debouncer.push(value.into(), now);
        self.state = SessionState::Typing;
    }

    /// Commit the debounced term once it has settled
    pub fn poll(&mut self, now: Instant) -> Option<QueryTicket> {
        let term = self.debouncer.poll(now)?;
        Some(self.commit(term))
    }

    fn commit(&mut self, term: String) -> QueryTicket {
        self.query_key += 1;
        self.term = term;
        self.state = SessionState::Querying;
        debug!(key = self.query_key, term = %self.term, "Search term committed");

        QueryTicket {
            key: self.query_key,
            term: self.term.clone(),
        }
    }

    /// Accept results for a ticket; results for a superseded ticket are
    /// ignored and `false` is returned.
    pub fn complete(&mut self, ticket: &QueryTicket, results: SearchResults) -> bool {
        if ticket.key != self.query_key {
            debug!(stale = ticket.key, current = self.query_key, "Ignoring stale search results");
            return false;
        }

        self.results = results;
        self.state = SessionState::ResultsShown;
        true
    }

    /// Run the aggregated search for a ticket and apply the results
    pub async fn run_query(&mut self, ticket: &QueryTicket) -> bool {
        let results = self.services.search(&ticket.term).await;
        self.complete(ticket, results)
    }

    /// Add a shown result to the list.
    ///
    /// Clears the search first, then creates the item and links it. Once the
    /// item exists the list view is invalidated even if linking fails. The
    /// session is back to `Idle` afterwards either way.
    pub fn select(&mut self, selection: Selection) -> Result<IngestOutcome, SessionError> {
        let item = match selection {
            Selection::Book(index) => self
                .results
                .books
                .get(index)
                .map(|candidate| NewItem::Book(candidate.to_new_book()))
                .ok_or(SessionError::NoSuchResult {
                    category: Category::Book,
                    index,
                })?,
            Selection::Video(index) => self
                .results
                .videos
                .get(index)
                .map(|candidate| NewItem::Video(candidate.to_new_video()))
                .ok_or(SessionError::NoSuchResult {
                    category: Category::Video,
                    index,
                })?,
        };

        self.state = SessionState::Selecting;
        self.reset();

        let outcome = self.services.ingest(item);
        self.state = SessionState::Idle;

        match outcome {
            Ok(outcome) => {
                self.list_view.invalidate();
                info!(item_id = %outcome.item_id, "Selection added to list");
                Ok(outcome)
            }
            Err(err) => {
                if matches!(err, IngestError::LinkFailed { .. }) {
                    self.list_view.invalidate();
                }
                Err(err.into())
            }
        }
    }

    /// Empty the search box; in-flight queries become stale
    fn reset(&mut self) {
        self.debouncer.cancel();
        self.term.clear();
        self.query_key += 1;
        self.results = SearchResults::default();
    }
}
