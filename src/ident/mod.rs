//! Identifier generation
//!
//! Every row written by a sync gets two identifiers:
//! - a time-ordered 63-bit numeric id (snowflake layout: 41 bits of
//!   milliseconds since the epoch below, 10 bits of node id, 12 bits of
//!   per-millisecond sequence)
//! - a short lowercase alphanumeric code, the sqids encoding of that id
//!
//! The code is a pure function of the numeric id and the configured minimum
//! length, so the same id always yields the same code.

use crate::config::IdentifierConfig;
use chrono::Utc;
use sqids::Sqids;
use std::sync::Mutex;
use thiserror::Error;

/// Largest node id that fits in the node field
pub const MAX_NODE_ID: u16 = (1 << NODE_BITS) - 1;

/// 2010-11-04T01:42:54.657Z in milliseconds
const EPOCH_MS: i64 = 1_288_834_974_657;

const NODE_BITS: u8 = 10;
const SEQUENCE_BITS: u8 = 12;
const TIMESTAMP_BITS: u8 = 41;
const MAX_SEQUENCE: i64 = (1 << SEQUENCE_BITS) - 1;
const MAX_TIMESTAMP: i64 = (1 << TIMESTAMP_BITS) - 1;

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Errors raised while generating identifiers
#[derive(Debug, Error)]
pub enum IdError {
    #[error("Node id {0} out of range (max 1023)")]
    InvalidNode(u16),

    #[error("Clock moved backwards by {0}ms")]
    ClockMovedBackwards(i64),

    #[error("Timestamp space exhausted")]
    Exhausted,

    #[error("Generator state poisoned")]
    Poisoned,

    #[error("Failed to encode short code: {0}")]
    Encoding(#[from] sqids::Error),
}

/// A freshly generated identifier pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedId {
    pub id: i64,
    pub uid: String,
}

#[derive(Debug)]
struct ClockState {
    last_ms: i64,
    sequence: i64,
}

/// Process-unique identifier generator
///
/// Shared by reference; the clock state sits behind a mutex so ids stay
/// strictly increasing across callers.
pub struct IdGenerator {
    node_id: i64,
    sqids: Sqids,
    state: Mutex<ClockState>,
}

impl IdGenerator {
    /// Builds a generator from the identifier configuration
    pub fn new(config: &IdentifierConfig) -> Result<Self, IdError> {
        if config.node_id > MAX_NODE_ID {
            return Err(IdError::InvalidNode(config.node_id));
        }

        let sqids = Sqids::builder()
            .alphabet(ALPHABET.chars().collect())
            .min_length(config.min_length)
            .build()?;

        Ok(Self {
            node_id: i64::from(config.node_id),
            sqids,
            state: Mutex::new(ClockState {
                last_ms: 0,
                sequence: 0,
            }),
        })
    }

    /// Generates a new numeric id and its short code
    pub fn generate(&self) -> Result<GeneratedId, IdError> {
        let id = self.next_id()?;
        let uid = self.encode(id)?;
        Ok(GeneratedId { id, uid })
    }

    /// Encodes a numeric id into its short code
    pub fn encode(&self, id: i64) -> Result<String, IdError> {
        Ok(self.sqids.encode(&[id as u64])?)
    }

    /// Decodes a short code back to its numeric id
    pub fn decode(&self, uid: &str) -> Option<i64> {
        match self.sqids.decode(uid).as_slice() {
            [id] => i64::try_from(*id).ok(),
            _ => None,
        }
    }

    fn next_id(&self) -> Result<i64, IdError> {
        let mut state = self.state.lock().map_err(|_| IdError::Poisoned)?;

        let mut now = elapsed_millis();
        if now < state.last_ms {
            return Err(IdError::ClockMovedBackwards(state.last_ms - now));
        }

        if now == state.last_ms {
            state.sequence = (state.sequence + 1) & MAX_SEQUENCE;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond
                while now <= state.last_ms {
                    std::hint::spin_loop();
                    now = elapsed_millis();
                }
            }
        } else {
            state.sequence = 0;
        }

        if now > MAX_TIMESTAMP {
            return Err(IdError::Exhausted);
        }

        state.last_ms = now;

        Ok((now << (NODE_BITS + SEQUENCE_BITS))
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence)
    }
}

fn elapsed_millis() -> i64 {
    Utc::now().timestamp_millis() - EPOCH_MS
}
