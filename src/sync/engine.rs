//! Sync engine - one ingestion run from trigger to commit
//!
//! A run goes through these steps:
//! - Open the store and claim the per-source lock
//! - Resolve the testament uids once
//! - Fetch and parse the whole corpus (no writes yet)
//! - Finalize the corpus (chapter counts, sanity warnings)
//! - Merge everything in one transaction

use crate::config::Config;
use crate::corpus::{Corpus, CorpusCounts};
use crate::ident::IdGenerator;
use crate::source::{build_http_client, GatewayAdapter, SourceAdapter, SourceKind, TobaAdapter};
use crate::state::SyncPhase;
use crate::storage::{open_connection, CorpusStore, SqliteStore, SyncLock};
use crate::SyncError;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a committed run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub source: &'static str,
    pub phase: SyncPhase,
    pub elapsed: Duration,
    pub counts: CorpusCounts,
}

/// Runs syncs against the configured store
pub struct SyncEngine {
    config: Config,
    ids: Arc<IdGenerator>,
    client: Client,
}

impl SyncEngine {
    /// Creates a new engine instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(SyncEngine)` - Identifier generator and HTTP client are ready
    /// * `Err(SyncError)` - Bad node id or client construction failure
    pub fn new(config: Config) -> Result<Self, SyncError> {
        let ids = Arc::new(IdGenerator::new(&config.identifiers)?);
        let client = build_http_client(&config.http)?;

        Ok(Self {
            config,
            ids,
            client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens (or creates) the configured store
    pub fn open_store(&self) -> Result<SqliteStore, SyncError> {
        Ok(SqliteStore::new(&self.database_path(), Arc::clone(&self.ids))?)
    }

    fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.config.database.path)
    }

    /// Runs one sync of the selected source
    pub async fn run(&self, source: SourceKind) -> Result<SyncReport, SyncError> {
        match source {
            SourceKind::Gateway => {
                let adapter = GatewayAdapter::new(self.client.clone(), self.config.gateway.clone());
                self.run_with(&adapter).await
            }
            SourceKind::Toba => {
                let adapter = TobaAdapter::new(self.client.clone(), self.config.toba.clone())?;
                self.run_with(&adapter).await
            }
        }
    }

    /// Runs one sync with an arbitrary adapter
    pub async fn run_with<A: SourceAdapter>(&self, adapter: &A) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let source = adapter.name();

        let mut store = self.open_store()?;
        let _lock = SyncLock::acquire(
            open_connection(&self.database_path())?,
            source,
            Duration::from_secs(self.config.lock.stale_after_secs),
        )?;

        let testaments = store.resolve_testaments()?;

        let mut phase = SyncPhase::Idle;
        phase.advance(SyncPhase::Fetching)?;
        tracing::info!(source, "Fetching corpus");

        let mut corpus = match adapter.fetch_corpus(&testaments).await {
            Ok(corpus) => corpus,
            Err(e) => {
                phase.advance(SyncPhase::Failed)?;
                tracing::error!(source, error = %e, "Fetch failed, store untouched");
                return Err(e);
            }
        };

        phase.advance(SyncPhase::Parsing)?;
        finalize_corpus(&mut corpus);
        tracing::info!(source, counts = %corpus.counts(), "Corpus parsed");

        phase.advance(SyncPhase::Merging)?;
        let counts = match store.merge(&corpus) {
            Ok(counts) => {
                phase.advance(SyncPhase::Committed)?;
                counts
            }
            Err(e) => {
                phase.advance(SyncPhase::RolledBack)?;
                return Err(e.into());
            }
        };

        let elapsed = started.elapsed();
        tracing::info!(source, ?elapsed, "Sync committed");

        Ok(SyncReport {
            source,
            phase,
            elapsed,
            counts,
        })
    }
}

/// Settles derived book fields before the merge
fn finalize_corpus(corpus: &mut Corpus) {
    for version in corpus.languages.iter_mut().flat_map(|l| l.versions.iter_mut()) {
        for book in &mut version.books {
            book.refresh_chapters_count();

            if book.verses.is_empty() {
                tracing::warn!(version = %version.code, book = %book.name, "Book has no verses");
            }
            if book.testament_uid.is_none() {
                tracing::warn!(
                    version = %version.code,
                    book = %book.name,
                    "Book has no testament, merge will reject it"
                );
            }
        }
    }
}
