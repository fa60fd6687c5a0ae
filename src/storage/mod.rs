//! Storage module for persisting the corpus
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Testament seeding and lookup
//! - Transactional, idempotent corpus merges
//! - Per-source sync locks
//! - Row statistics

mod lock;
mod schema;
mod sqlite;
mod traits;

pub use lock::SyncLock;
pub use schema::{initialize_schema, CORPUS_TABLES};
pub use sqlite::{open_connection, SqliteStore};
pub use traits::{CorpusStore, StorageError, StorageResult};

/// Row counts of the corpus tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub testaments: u64,
    pub languages: u64,
    pub versions: u64,
    pub books: u64,
    pub verses: u64,
}

impl TableCounts {
    /// Pairs each table name with its count, in hierarchy order
    pub fn rows(&self) -> [(&'static str, u64); 5] {
        [
            ("testaments", self.testaments),
            ("languages", self.languages),
            ("versions", self.versions),
            ("books", self.books),
            ("verses", self.verses),
        ]
    }
}
