//! Bible-Sync: scripture corpus ingestion
//!
//! This crate crawls two scripture-publishing sites, builds an in-memory
//! language → version → book → verse tree and merges it idempotently into a
//! SQLite store under deterministic identifiers.

pub mod config;
pub mod corpus;
pub mod ident;
pub mod output;
pub mod source;
pub mod state;
pub mod storage;
pub mod sync;

use thiserror::Error;

/// Main error type for sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Unexpected HTML structure at {url}: {message}")]
    HtmlStructure { url: String, message: String },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Identifier error: {0}")]
    Identifier(#[from] ident::IdError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Source {source_name} is already being synced by {holder}")]
    Locked { source_name: String, holder: String },

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SyncPhase,
        to: state::SyncPhase,
    },

    #[error("Sync cancelled")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use corpus::Corpus;
pub use source::SourceKind;
pub use state::SyncPhase;
pub use sync::{SyncEngine, SyncReport};
