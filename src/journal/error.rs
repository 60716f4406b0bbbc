//! Error type shared by every journal operation.

use std::io;

use thiserror::Error;

use crate::types::EventId;

/// Errors that can occur during journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The record for this event does not exist on disk.
    #[error("event {0} does not exist")]
    NotFound(EventId),

    /// A record file could not be decoded.
    #[error("malformed record for event {id}: {reason}")]
    MalformedRecord { id: EventId, reason: String },

    /// The hint file does not contain a decimal integer.
    #[error("invalid hint: {0:?}")]
    MalformedHint(String),

    /// A caller-supplied argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Every ID up to the configured limit is already taken.
    #[error("no event IDs left below {limit}")]
    AllocatorExhausted { limit: u64 },
}

impl JournalError {
    pub(crate) fn malformed(id: EventId, reason: impl Into<String>) -> Self {
        JournalError::MalformedRecord {
            id,
            reason: reason.into(),
        }
    }
}

/// Result type for journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;
