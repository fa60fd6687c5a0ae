//! State module for tracking sync progress
//!
//! # Components
//!
//! - `SyncPhase`: Tracks the phase of a whole sync run (fetching, merging, committed, ...)
//! - `VerseCursor`: Sticky chapter/verse state applied node by node while parsing

mod sync_phase;
mod verse_cursor;

// Re-export main types
pub use sync_phase::SyncPhase;
pub use verse_cursor::{strip_leading_numeral, SkipReason, Step, VerseCursor, VerseNode};
