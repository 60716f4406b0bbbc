//! Filesystem-backed event journal.
//!
//! A journal lives entirely in a directory tree, so it survives process
//! crashes and can be shared by independent processes without a lock server.
//!
//! # File Layout
//!
//! ```text
//! <root>/.journal/          journal directory, mode 0700
//! <root>/.journal/<id>/     one directory per event, mode 0700
//! <root>/.journal/<id>/event  record file, mode 0700
//! <root>/.journal/.hint     decimal of the next ID worth trying
//! ```
//!
//! # Concurrency
//!
//! - ID allocation relies on atomic directory creation only (see [`allocator`]).
//! - Closing an event overwrites the last byte of its record in place, so a
//!   crash leaves either the old or the new flag, never a truncated record.
//! - The in-memory hint and active event are guarded by a per-instance lock.
//!   Two `Journal` handles on the same root do not share the active event,
//!   so each computes overlap from its own events only.
//!
//! # Module Structure
//!
//! - [`codec`]: record encoding
//! - [`allocator`]: directory-creation ID allocation
//! - [`hint`]: hint file persistence
//! - [`store`]: the [`Journal`] handle
//! - [`scan`]: parallel listing of every event

pub mod allocator;
pub mod codec;
pub mod config;
pub mod error;
pub mod hint;
pub mod scan;
pub mod store;


use std::fs::{DirBuilder, OpenOptions};
use std::io;
use std::path::Path;
#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

pub use config::JournalConfig;
pub use error::{JournalError, Result};
pub use store::Journal;

/// Name of the journal directory under the user's root.
pub const JOURNAL_DIR_NAME: &str = ".journal";

/// Name of the record file inside each event directory.
pub const RECORD_FILE_NAME: &str = "event";

/// Name of the hint file inside the journal directory.
pub const HINT_FILE_NAME: &str = ".hint";

/// Permission bits for every directory and file the journal creates.
pub const JOURNAL_PERMISSION: u32 = 0o700;

/// A non-recursive directory builder using the journal's permissions.
pub(crate) fn journal_dir_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    builder.mode(JOURNAL_PERMISSION);
    builder
}

/// Write-only open options using the journal's permissions.
pub(crate) fn record_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true);
    #[cfg(unix)]
    options.mode(JOURNAL_PERMISSION);
    options
}

/// Syncs a directory so that entries created or renamed in it are durable.
pub(crate) fn sync_dir(dir: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}
