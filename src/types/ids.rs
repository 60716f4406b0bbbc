//! Newtype wrapper for journal event identifiers.
//!
//! Event IDs are allocated sequentially per journal root and double as the
//! on-disk directory name, so the decimal rendering is part of the format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an event within one journal root.
///
/// The ID is also the name of the event's directory (`<root>/.journal/<id>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl EventId {
    /// Returns the underlying integer.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Returns the ID that follows this one, or `None` on overflow.
    pub fn next(self) -> Option<EventId> {
        self.0.checked_add(1).map(EventId)
    }

    /// Parses a directory name as an event ID.
    ///
    /// Only the canonical decimal form is accepted: `"7"` parses but `"007"`
    /// and `"+7"` do not, since neither is a directory the allocator would
    /// ever create.
    pub fn from_dir_name(name: &str) -> Option<EventId> {
        let id: u64 = name.parse().ok()?;
        if id.to_string() == name {
            Some(EventId(id))
        } else {
            None
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EventId {
    fn from(n: u64) -> Self {
        EventId(n)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(EventId)
    }
}
