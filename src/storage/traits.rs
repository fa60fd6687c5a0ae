//! Storage traits and error types
//!
//! This module defines the trait interface for corpus stores and
//! associated error types.

use crate::corpus::{Corpus, CorpusCounts, TestamentIds};
use crate::ident::IdError;
use crate::storage::TableCounts;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Identifier error: {0}")]
    Identifier(#[from] IdError),

    #[error("Failed to merge {entity} {key}: {source}")]
    Merge {
        entity: &'static str,
        key: String,
        source: rusqlite::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for corpus store implementations
pub trait CorpusStore {
    /// Looks up the Old/New testament uids by their fixed codes
    ///
    /// A missing row yields `None` for that testament; it is not an error
    /// until a book referencing it is merged.
    fn resolve_testaments(&self) -> StorageResult<TestamentIds>;

    /// Upserts the whole corpus inside one transaction
    ///
    /// Any failure rolls back every row written by this call. On success the
    /// counts of merged entities are returned.
    fn merge(&mut self, corpus: &Corpus) -> StorageResult<CorpusCounts>;

    /// Row counts of every corpus table
    fn table_counts(&self) -> StorageResult<TableCounts>;
}
