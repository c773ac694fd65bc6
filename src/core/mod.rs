//! Core operation handlers.
//!
//! This module contains:
//! - Search: fan-out across the external catalogs
//! - Ingest: create mutations, list membership, create-then-link
//! - Services: the injected context every handler runs in

pub mod ingest;
pub mod search;
pub mod services;

// Re-export commonly used types
pub use ingest::{
    IngestError, IngestOutcome, LinkFailurePolicy, NewItem, UnresolvedAuthorPolicy,
};
pub use search::{SearchAggregator, SearchResults};
pub use services::Services;
