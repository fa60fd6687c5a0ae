//! Output module for reporting sync results
//!
//! This module handles:
//! - Rendering the outcome of a sync run (result, elapsed time, counts)
//! - Rendering store statistics for `--stats`

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, StoreStatistics};

use crate::sync::SyncReport;
use crate::SyncError;
use std::time::Duration;

/// Renders a committed run
pub fn format_report(report: &SyncReport) -> String {
    format!(
        "✓ Sync of {} {} in {}\n  {}\n",
        report.source,
        report.phase,
        format_elapsed(report.elapsed),
        report.counts
    )
}

/// Renders a run that ended in an error
pub fn format_failure(source: &str, elapsed: Duration, error: &SyncError) -> String {
    format!(
        "✗ Sync of {} failed after {}\n  {}\n",
        source,
        format_elapsed(elapsed),
        error
    )
}

pub fn print_report(report: &SyncReport) {
    print!("{}", format_report(report));
}

pub fn print_failure(source: &str, elapsed: Duration, error: &SyncError) {
    eprint!("{}", format_failure(source, elapsed, error));
}

/// Seconds with millisecond precision, or minutes and seconds past a minute
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.3}s", elapsed.as_secs_f64())
    }
}
