//! dirjournal - an event journal kept as numbered directories on the filesystem.
//!
//! Each event is a directory holding a single record file. Events can nest:
//! an event created while another is still open records that event as its
//! overlap. All state lives in the directory tree, so a journal survives
//! crashes and can be shared by independent processes.

pub mod journal;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use journal::{Journal, JournalConfig, JournalError, Result};
pub use types::{Event, EventId};
