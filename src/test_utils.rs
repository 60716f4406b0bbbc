//! Shared test utilities and arbitrary generators for property-based testing.

use crate::types::{Event, EventId};
use proptest::prelude::*;

pub fn arb_event_id() -> impl Strategy<Value = EventId> {
    (0..=i64::MAX as u64).prop_map(EventId)
}

/// A description element: anything but the record separator.
pub fn arb_description_part() -> impl Strategy<Value = String> {
    "[^\\x00]{0,24}".prop_map(String::from)
}

pub fn arb_description() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_description_part(), 1..6)
}

pub fn arb_event() -> impl Strategy<Value = Event> {
    (
        arb_event_id(),
        arb_description(),
        prop::option::of(arb_event_id()),
        any::<bool>(),
    )
        .prop_map(|(id, description, overlap, complete)| {
            Event::from_parts(id, description, overlap, complete)
        })
}
