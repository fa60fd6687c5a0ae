//! Configuration module for Bible-Sync
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a missing key falls back to the production
//! source settings.
//!
//! # Example
//!
//! ```no_run
//! use bible_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("bible-sync.toml")).unwrap();
//! println!("Database: {}", config.database.path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DatabaseConfig, GatewayConfig, HttpConfig, IdentifierConfig, LockConfig, TobaConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
