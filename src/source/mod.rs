//! Source adapters
//!
//! This module contains everything that talks to the scripture sites:
//! - HTTP fetching (one sequential GET at a time, no retry)
//! - Chapter batching for passage requests
//! - Ordered verse traversal with per-source projectors
//! - The two adapters that turn a site into a `Corpus`

mod chunker;
mod fetcher;
mod gateway;
mod toba;
mod traversal;

pub use chunker::{chapter_batches, passage_query};
pub use fetcher::{build_http_client, fetch_html, join_path};
pub use gateway::{parse_book_list, parse_passage, parse_version_index, GatewayAdapter};
pub use toba::{parse_book_index, parse_book_page, TobaAdapter, TobaProjector};
pub use traversal::{traverse, NodeProjector, Traversal};

use crate::corpus::{Corpus, TestamentIds};
use crate::SyncError;
use std::fmt;

/// Fetches and parses one external site into a corpus
///
/// Implementations fetch sequentially and return on the first fatal error.
/// Recoverable problems (a malformed numeral, an unrecognized line) are
/// logged and skipped inside the adapter.
#[allow(async_fn_in_trait)]
pub trait SourceAdapter {
    /// Name used for locking and logging
    fn name(&self) -> &'static str;

    async fn fetch_corpus(&self, testaments: &TestamentIds) -> Result<Corpus, SyncError>;
}

/// Source selector accepted by the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    /// Multi-version catalogue site
    Gateway,
    /// Single-version Batak Toba site
    Toba,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Toba => "toba",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
