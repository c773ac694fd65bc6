//! Client-side search orchestration.
//!
//! 1. **Debounce**: keystrokes collapse to the last value within a window
//! 2. **Session**: committed terms, stale-result filtering, selections
//! 3. **List view**: cached list, invalidated after mutations

pub mod debounce;
pub mod list_view;
pub mod session;

// Re-export key types
pub use debounce::{spawn_debouncer, Debouncer};
pub use list_view::ListView;
pub use session::{QueryTicket, SearchSession, Selection, SessionError, SessionState};
