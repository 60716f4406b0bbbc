//! Core domain types for the journal.

pub mod event;
pub mod ids;

pub use event::Event;
pub use ids::EventId;
