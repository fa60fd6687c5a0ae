//! Sync orchestration
//!
//! The engine wires the store, the lock, an adapter and the run state machine
//! together. Entry points:
//! - `SyncEngine::run` for one of the built-in sources
//! - `SyncEngine::run_with` for any `SourceAdapter`

mod engine;

pub use engine::{SyncEngine, SyncReport};
