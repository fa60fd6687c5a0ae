//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CorpusStore trait.

use crate::corpus::{Book, Corpus, CorpusCounts, Language, Testament, TestamentIds, Verse, Version};
use crate::ident::IdGenerator;
use crate::storage::schema::{initialize_schema, CORPUS_TABLES};
use crate::storage::traits::{CorpusStore, StorageError, StorageResult};
use crate::storage::TableCounts;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// How long a connection waits on a competing writer before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
    ids: Arc<IdGenerator>,
}

impl SqliteStore {
    /// Opens or creates the store and seeds the testament rows
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `ids` - Generator used for every new row
    pub fn new(path: &Path, ids: Arc<IdGenerator>) -> StorageResult<Self> {
        let conn = open_connection(path)?;
        initialize_schema(&conn)?;

        let mut store = Self { conn, ids };
        store.seed_testaments()?;
        Ok(store)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(ids: Arc<IdGenerator>) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;

        let mut store = Self { conn, ids };
        store.seed_testaments()?;
        Ok(store)
    }

    /// Inserts the Old/New testament rows when they are missing
    ///
    /// Concurrent openers serialize on the IMMEDIATE write lock. A row
    /// inserted by another opener is left as it is.
    fn seed_testaments(&mut self) -> StorageResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        for testament in Testament::all() {
            let generated = self.ids.generate()?;
            let now = timestamp();
            let inserted = tx.execute(
                "INSERT INTO testaments (id, uid, name, code, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT (code) DO NOTHING",
                params![
                    generated.id,
                    generated.uid,
                    testament.name(),
                    testament.code(),
                    now
                ],
            )?;

            let uid: String = tx.query_row(
                "SELECT uid FROM testaments WHERE code = ?1",
                params![testament.code()],
                |row| row.get(0),
            )?;
            if inserted > 0 {
                tracing::info!(testament = testament.code(), uid = %uid, "Seeded testament");
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Direct access to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl CorpusStore for SqliteStore {
    fn resolve_testaments(&self) -> StorageResult<TestamentIds> {
        let mut stmt = self
            .conn
            .prepare("SELECT uid FROM testaments WHERE code = ?1")?;

        let mut resolved = TestamentIds::default();
        for testament in Testament::all() {
            let uid: Option<String> = stmt
                .query_row(params![testament.code()], |row| row.get(0))
                .optional()?;
            if uid.is_none() {
                tracing::warn!(testament = testament.code(), "Testament row missing");
            }
            match testament {
                Testament::Old => resolved.old = uid,
                Testament::New => resolved.new = uid,
            }
        }

        Ok(resolved)
    }

    fn merge(&mut self, corpus: &Corpus) -> StorageResult<CorpusCounts> {
        let tx = self.conn.transaction()?;

        match merge_corpus(&tx, &self.ids, corpus) {
            Ok(counts) => {
                tx.commit()?;
                tracing::info!(%counts, "Merge committed");
                Ok(counts)
            }
            Err(e) => {
                tracing::error!(error = %e, "Merge failed, rolling back");
                if let Err(rollback) = tx.rollback() {
                    tracing::error!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    fn table_counts(&self) -> StorageResult<TableCounts> {
        let mut counts = [0u64; 5];
        for (slot, table) in counts.iter_mut().zip(CORPUS_TABLES) {
            let count: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })?;
            *slot = count as u64;
        }

        let [testaments, languages, versions, books, verses] = counts;
        Ok(TableCounts {
            testaments,
            languages,
            versions,
            books,
            verses,
        })
    }
}

/// Opens a file connection with the store's pragmas applied
pub fn open_connection(path: &Path) -> StorageResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    Ok(conn)
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Walks the corpus top-down; the first failure aborts the walk
fn merge_corpus(
    tx: &Transaction<'_>,
    ids: &IdGenerator,
    corpus: &Corpus,
) -> StorageResult<CorpusCounts> {
    let now = timestamp();
    let mut counts = CorpusCounts::default();

    for language in &corpus.languages {
        let language_uid = upsert_language(tx, ids, language, &now)?;
        counts.languages += 1;

        for version in &language.versions {
            let version_uid = upsert_version(tx, ids, version, &language_uid, &now)?;
            counts.versions += 1;
            tracing::debug!(version = %version.code, uid = %version_uid, "Merging version");

            for book in &version.books {
                let book_uid = upsert_book(tx, ids, book, &version_uid, &now)?;
                counts.books += 1;

                for verse in &book.verses {
                    upsert_verse(tx, ids, verse, &book.name, &book_uid, &now)?;
                    counts.verses += 1;
                }
            }
        }
    }

    Ok(counts)
}

fn upsert_language(
    tx: &Transaction<'_>,
    ids: &IdGenerator,
    language: &Language,
    now: &str,
) -> StorageResult<String> {
    let generated = ids.generate()?;
    tx.query_row(
        "INSERT INTO languages (id, uid, name, code, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT (code) DO UPDATE SET
             name = excluded.name,
             updated_at = excluded.updated_at
         RETURNING uid",
        params![generated.id, generated.uid, language.name, language.code, now],
        |row| row.get(0),
    )
    .map_err(|source| StorageError::Merge {
        entity: "language",
        key: language.code.clone(),
        source,
    })
}

fn upsert_version(
    tx: &Transaction<'_>,
    ids: &IdGenerator,
    version: &Version,
    language_uid: &str,
    now: &str,
) -> StorageResult<String> {
    let generated = ids.generate()?;
    tx.query_row(
        "INSERT INTO versions (id, uid, language_uid, name, code, slug, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT (code) DO UPDATE SET
             language_uid = excluded.language_uid,
             name = excluded.name,
             slug = excluded.slug,
             updated_at = excluded.updated_at
         RETURNING uid",
        params![
            generated.id,
            generated.uid,
            language_uid,
            version.name,
            version.code,
            version.slug,
            now
        ],
        |row| row.get(0),
    )
    .map_err(|source| StorageError::Merge {
        entity: "version",
        key: version.code.clone(),
        source,
    })
}

fn upsert_book(
    tx: &Transaction<'_>,
    ids: &IdGenerator,
    book: &Book,
    version_uid: &str,
    now: &str,
) -> StorageResult<String> {
    let generated = ids.generate()?;
    tx.query_row(
        "INSERT INTO books (id, uid, testament_uid, version_uid, name, chapters_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT (name, version_uid) DO UPDATE SET
             testament_uid = excluded.testament_uid,
             chapters_count = excluded.chapters_count,
             updated_at = excluded.updated_at
         RETURNING uid",
        params![
            generated.id,
            generated.uid,
            book.testament_uid,
            version_uid,
            book.name,
            book.chapters_count,
            now
        ],
        |row| row.get(0),
    )
    .map_err(|source| StorageError::Merge {
        entity: "book",
        key: book.name.clone(),
        source,
    })
}

fn upsert_verse(
    tx: &Transaction<'_>,
    ids: &IdGenerator,
    verse: &Verse,
    book_name: &str,
    book_uid: &str,
    now: &str,
) -> StorageResult<String> {
    let generated = ids.generate()?;
    tx.query_row(
        "INSERT INTO verses (id, uid, book_uid, chapter, number, body, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT (number, chapter, book_uid) DO UPDATE SET
             body = excluded.body,
             updated_at = excluded.updated_at
         RETURNING uid",
        params![
            generated.id,
            generated.uid,
            book_uid,
            verse.chapter,
            verse.number,
            verse.body,
            now
        ],
        |row| row.get(0),
    )
    .map_err(|source| StorageError::Merge {
        entity: "verse",
        key: format!("{} {}:{}", book_name, verse.chapter, verse.number),
        source,
    })
}
