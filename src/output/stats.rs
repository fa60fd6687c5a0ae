//! Statistics from the scripture store
//!
//! This module provides functionality for extracting and displaying
//! row statistics from the storage layer.

use crate::storage::{CorpusStore, TableCounts};
use crate::SyncError;

/// Store statistics summary
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StoreStatistics {
    /// Row count per corpus table
    pub tables: TableCounts,
}

impl StoreStatistics {
    /// Average verses per book, 0 for an empty store
    pub fn verses_per_book(&self) -> f64 {
        if self.tables.books == 0 {
            0.0
        } else {
            self.tables.verses as f64 / self.tables.books as f64
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The store to query
pub fn load_statistics(store: &dyn CorpusStore) -> Result<StoreStatistics, SyncError> {
    Ok(StoreStatistics {
        tables: store.table_counts()?,
    })
}

/// Renders statistics as the text printed by `--stats`
pub fn format_statistics(stats: &StoreStatistics) -> String {
    let mut out = String::from("=== Store Statistics ===\n\n");

    for (table, count) in stats.tables.rows() {
        out.push_str(&format!("  {:<12} {}\n", table, count));
    }

    out.push_str(&format!(
        "\nAverage verses per book: {:.1}\n",
        stats.verses_per_book()
    ));
    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    print!("{}", format_statistics(stats));
}
