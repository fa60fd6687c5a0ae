/// Phase definitions for tracking a sync run
///
/// A run moves strictly forward: Idle → Fetching → Parsing → Merging and
/// ends in Committed or RolledBack. A fetch that aborts before any write
/// ends in Failed, which leaves the store untouched.
use crate::SyncError;
use std::fmt;

/// Represents the current phase of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    // ===== Active Phases =====
    /// Run created, nothing fetched yet
    Idle,

    /// Downloading source pages
    Fetching,

    /// Turning downloaded markup into the corpus
    Parsing,

    /// Upserting the corpus inside one transaction
    Merging,

    // ===== Terminal Phases =====
    /// Transaction committed
    Committed,

    /// Transaction rolled back after a store or identifier error
    RolledBack,

    /// Fetch or parse aborted before the merge started
    Failed,
}

impl SyncPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack | Self::Failed)
    }

    /// Returns true if the run finished with its writes committed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Committed)
    }

    /// Returns true if `to` is a legal next phase
    pub fn can_transition_to(&self, to: SyncPhase) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Fetching)
                | (Self::Fetching, Self::Parsing)
                | (Self::Fetching, Self::Failed)
                | (Self::Parsing, Self::Failed)
                | (Self::Parsing, Self::Merging)
                | (Self::Merging, Self::Committed)
                | (Self::Merging, Self::RolledBack)
        )
    }

    /// Moves to `to`, rejecting illegal transitions
    pub fn advance(&mut self, to: SyncPhase) -> Result<(), SyncError> {
        if !self.can_transition_to(to) {
            return Err(SyncError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Merging => "merging",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
