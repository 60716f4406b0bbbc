//! The journal event record.

use serde::Serialize;
use std::fmt;

use super::ids::EventId;

/// One logged unit of work.
///
/// `description` and `overlap` are fixed when the event is created. The only
/// state that changes afterwards is the completion flag, which goes from
/// `false` to `true` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    id: EventId,
    description: Vec<String>,
    /// The event that was active in the creating journal when this one was
    /// created. `None` when nothing was open.
    overlap: Option<EventId>,
    complete: bool,
}

impl Event {
    /// Creates a new, incomplete event.
    pub fn new(id: EventId, description: Vec<String>, overlap: Option<EventId>) -> Self {
        Event {
            id,
            description,
            overlap,
            complete: false,
        }
    }

    pub(crate) fn from_parts(
        id: EventId,
        description: Vec<String>,
        overlap: Option<EventId>,
        complete: bool,
    ) -> Self {
        Event {
            id,
            description,
            overlap,
            complete,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// The command and arguments this event records, in order.
    pub fn description(&self) -> &[String] {
        &self.description
    }

    /// The enclosing event, if one was open at creation time.
    pub fn overlap(&self) -> Option<EventId> {
        self.overlap
    }

    pub fn is_overlapping(&self) -> bool {
        self.overlap.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.complete { "done" } else { "running" };
        write!(f, "#{} [{}] {}", self.id, status, self.description.join(" "))?;
        if let Some(parent) = self.overlap {
            write!(f, " (inside #{})", parent)?;
        }
        Ok(())
    }
}
