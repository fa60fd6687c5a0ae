//! Per-source single-flight guard
//!
//! Two runs against the same source would race on the same upsert targets.
//! A run claims the source by inserting a row into `sync_locks` and deletes
//! it when the guard drops. A lock older than the configured staleness is
//! assumed to belong to a crashed run and is taken over.

use crate::SyncError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::time::Duration;

/// Held lock on one source; released on drop
pub struct SyncLock {
    conn: Connection,
    source: String,
    holder: String,
}

impl SyncLock {
    /// Claims `source`, failing with `SyncError::Locked` while a live lock exists
    ///
    /// The connection must point at a store whose schema is initialized. It
    /// is owned by the guard so the release does not compete with the
    /// store's own transaction.
    pub fn acquire(conn: Connection, source: &str, stale_after: Duration) -> Result<Self, SyncError> {
        let mut conn = conn;
        let holder = format!("pid-{}-{}", std::process::id(), Utc::now().timestamp_millis());

        {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing: Option<(String, String)> = tx
                .query_row(
                    "SELECT holder, acquired_at FROM sync_locks WHERE source = ?1",
                    params![source],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            if let Some((current_holder, acquired_at)) = existing {
                let age = lock_age(&acquired_at);
                match age {
                    Some(age) if age < stale_after => {
                        return Err(SyncError::Locked {
                            source_name: source.to_string(),
                            holder: current_holder,
                        });
                    }
                    _ => {
                        tracing::warn!(
                            source,
                            holder = %current_holder,
                            acquired_at = %acquired_at,
                            "Taking over stale sync lock"
                        );
                    }
                }
            }

            tx.execute(
                "INSERT INTO sync_locks (source, holder, acquired_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (source) DO UPDATE SET
                     holder = excluded.holder,
                     acquired_at = excluded.acquired_at",
                params![
                    source,
                    holder,
                    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
                ],
            )?;
            tx.commit()?;
        }

        tracing::debug!(source, holder = %holder, "Acquired sync lock");

        Ok(Self {
            conn,
            source: source.to_string(),
            holder,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        let released = self.conn.execute(
            "DELETE FROM sync_locks WHERE source = ?1 AND holder = ?2",
            params![self.source, self.holder],
        );
        match released {
            Ok(_) => tracing::debug!(source = %self.source, "Released sync lock"),
            Err(e) => tracing::error!(source = %self.source, error = %e, "Failed to release sync lock"),
        }
    }
}

/// Age of a lock row; `None` when the timestamp is unreadable
fn lock_age(acquired_at: &str) -> Option<Duration> {
    let acquired = DateTime::parse_from_rfc3339(acquired_at).ok()?;
    let elapsed = Utc::now().signed_duration_since(acquired.with_timezone(&Utc));
    // A timestamp from the future counts as fresh
    Some(elapsed.to_std().unwrap_or(Duration::ZERO))
}
