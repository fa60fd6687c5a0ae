//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the scripture store.
//! Rows reference each other by uid so that a uid stays the public handle of
//! a row for its whole life.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Fixed Old/New partition, seeded once
CREATE TABLE IF NOT EXISTS testaments (
    id INTEGER PRIMARY KEY,
    uid TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    code TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS languages (
    id INTEGER PRIMARY KEY,
    uid TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS languages_code_key ON languages(code);

CREATE TABLE IF NOT EXISTS versions (
    id INTEGER PRIMARY KEY,
    uid TEXT NOT NULL UNIQUE,
    language_uid TEXT NOT NULL REFERENCES languages(uid) ON UPDATE CASCADE,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    slug TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS versions_code_key ON versions(code);
CREATE UNIQUE INDEX IF NOT EXISTS versions_slug_key ON versions(slug);

CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY,
    uid TEXT NOT NULL UNIQUE,
    testament_uid TEXT NOT NULL REFERENCES testaments(uid) ON UPDATE CASCADE,
    version_uid TEXT NOT NULL REFERENCES versions(uid) ON UPDATE CASCADE,
    name TEXT NOT NULL,
    chapters_count INTEGER NOT NULL DEFAULT 0 CHECK (chapters_count >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS books_name_version_uid_key ON books(name, version_uid);

CREATE TABLE IF NOT EXISTS verses (
    id INTEGER PRIMARY KEY,
    uid TEXT NOT NULL UNIQUE,
    book_uid TEXT NOT NULL REFERENCES books(uid) ON UPDATE CASCADE,
    chapter INTEGER NOT NULL CHECK (chapter > 0),
    number INTEGER NOT NULL CHECK (number > 0),
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS verses_number_chapter_book_uid_key ON verses(number, chapter, book_uid);
CREATE INDEX IF NOT EXISTS idx_verses_book ON verses(book_uid, chapter, number);

-- One row per source while a sync run holds it
CREATE TABLE IF NOT EXISTS sync_locks (
    source TEXT PRIMARY KEY,
    holder TEXT NOT NULL,
    acquired_at TEXT NOT NULL
);
"#;

/// Tables reported by `--stats`, in hierarchy order
pub const CORPUS_TABLES: [&str; 5] = ["testaments", "languages", "versions", "books", "verses"];

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
