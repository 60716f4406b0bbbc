//! Record codec.
//!
//! A record is the overlap, each description element, and the completion
//! flag, joined by NUL:
//!
//! ```text
//! <overlap>\0<description[0]>\0...\0<description[n-1]>\0<flag>
//! ```
//!
//! `overlap` is a signed decimal with `-1` meaning "no enclosing event".
//! `flag` is a single byte, `0` or `1`, and is always the last byte of the
//! file so that closing an event can patch it in place.

use tracing::warn;

use crate::types::{Event, EventId};

use super::error::{JournalError, Result};

/// Field separator.
pub const SEPARATOR: char = '\0';

/// Encoded overlap for an event with no enclosing event.
pub const NO_OVERLAP: i64 = -1;

/// Flag byte of an event still running.
pub const INCOMPLETE_FLAG: u8 = b'0';

/// Flag byte of a closed event.
pub const COMPLETE_FLAG: u8 = b'1';

/// Encodes an event into its record form.
pub fn serialize(event: &Event) -> String {
    let overlap = match event.overlap() {
        Some(id) => id.to_string(),
        None => NO_OVERLAP.to_string(),
    };
    let flag = if event.is_complete() {
        COMPLETE_FLAG
    } else {
        INCOMPLETE_FLAG
    };

    let mut out = overlap;
    for part in event.description() {
        out.push(SEPARATOR);
        out.push_str(part);
    }
    out.push(SEPARATOR);
    out.push(flag as char);
    out
}

/// Decodes the record of event `id`.
///
/// Any flag other than `0` decodes as complete. Unexpected flags are logged.
pub fn deserialize(id: EventId, raw: &[u8]) -> Result<Event> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| JournalError::malformed(id, format!("not UTF-8: {}", e)))?;
    let parts: Vec<&str> = text.split(SEPARATOR).collect();

    let overlap: i64 = parts[0]
        .parse()
        .map_err(|_| JournalError::malformed(id, format!("bad overlap {:?}", parts[0])))?;
    let overlap = match overlap {
        NO_OVERLAP => None,
        n if n >= 0 => Some(EventId(n as u64)),
        n => return Err(JournalError::malformed(id, format!("negative overlap {}", n))),
    };

    // overlap, at least one description element, flag
    if parts.len() < 3 {
        return Err(JournalError::malformed(id, "missing description"));
    }

    let last = parts.len() - 1;
    let flag = parts[last];
    let complete = flag != "0";
    if flag != "1" && flag != "0" {
        warn!(event = %id, flag, "unrecognised completion flag, treating as complete");
    }

    let description = parts[1..last].iter().map(|s| s.to_string()).collect();
    Ok(Event::from_parts(id, description, overlap, complete))
}

/// Rejects descriptions that cannot be encoded.
pub fn validate_description(description: &[String]) -> Result<()> {
    if description.is_empty() {
        return Err(JournalError::InvalidArgument(
            "event description must not be empty".into(),
        ));
    }
    if description.iter().any(|part| part.contains(SEPARATOR)) {
        return Err(JournalError::InvalidArgument(
            "event description must not contain NUL".into(),
        ));
    }
    Ok(())
}
