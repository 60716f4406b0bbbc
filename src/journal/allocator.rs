//! Sequential ID allocation by directory creation.
//!
//! Creating `<journal>/<id>` is the only mutual-exclusion primitive: the
//! filesystem guarantees at most one creator succeeds, across threads and
//! processes alike. An "already exists" failure means somebody else owns
//! that ID, so the allocator moves on to the next one. Once a directory is
//! claimed the record file inside it is created exclusively as well.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::types::EventId;

use super::error::{JournalError, Result};
use super::{RECORD_FILE_NAME, journal_dir_builder, record_options};

/// A freshly claimed ID together with its empty record file.
#[derive(Debug)]
pub struct Allocation {
    pub id: EventId,
    /// The record file, opened write-only. Nothing has been written yet.
    pub record: File,
    pub record_path: PathBuf,
}

impl Allocation {
    /// The hint to use after this allocation: the first ID not yet tried.
    pub fn next_hint(&self) -> u64 {
        self.id.get() + 1
    }
}

/// Claims the lowest free ID in `hint..=max_id`.
///
/// Every ID below `hint` is assumed taken. IDs in the range that already
/// have a directory are skipped. Fails with `AllocatorExhausted` when every
/// ID up to `max_id` is taken, and propagates any other filesystem error.
pub fn allocate(journal_dir: &Path, hint: u64, max_id: u64) -> Result<Allocation> {
    let builder = journal_dir_builder();
    let mut candidate = hint;

    loop {
        if candidate > max_id {
            return Err(JournalError::AllocatorExhausted { limit: max_id });
        }

        let id = EventId(candidate);
        let dir = journal_dir.join(id.to_string());
        match builder.create(&dir) {
            Ok(()) => {
                let record_path = dir.join(RECORD_FILE_NAME);
                let record = record_options().create_new(true).open(&record_path)?;
                return Ok(Allocation {
                    id,
                    record,
                    record_path,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                trace!(id = candidate, "event id taken, trying next");
                candidate = candidate
                    .checked_add(1)
                    .ok_or(JournalError::AllocatorExhausted { limit: max_id })?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[test]
    fn first_allocation_is_zero() {
        let dir = tempdir().unwrap();
        let alloc = allocate(dir.path(), 0, u64::MAX).unwrap();
        assert_eq!(alloc.id, EventId(0));
        assert_eq!(alloc.next_hint(), 1);
        assert!(alloc.record_path.exists());
        assert_eq!(alloc.record_path, dir.path().join("0").join("event"));
    }

    #[test]
    fn skips_taken_ids() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("0")).unwrap();
        std::fs::create_dir(dir.path().join("1")).unwrap();

        let alloc = allocate(dir.path(), 0, u64::MAX).unwrap();
        assert_eq!(alloc.id, EventId(2));
    }

    #[test]
    fn starts_at_hint() {
        let dir = tempdir().unwrap();
        let alloc = allocate(dir.path(), 10, u64::MAX).unwrap();
        assert_eq!(alloc.id, EventId(10));
        assert!(!dir.path().join("0").exists());
    }

    #[test]
    fn stale_hint_still_finds_free_id() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            allocate(dir.path(), 0, u64::MAX).unwrap();
            assert!(dir.path().join(i.to_string()).exists());
        }
        let alloc = allocate(dir.path(), 2, u64::MAX).unwrap();
        assert_eq!(alloc.id, EventId(5));
    }

    #[test]
    fn exhausted_when_range_is_taken() {
        let dir = tempdir().unwrap();
        allocate(dir.path(), 0, 1).unwrap();
        allocate(dir.path(), 0, 1).unwrap();

        let result = allocate(dir.path(), 0, 1);
        assert!(matches!(
            result,
            Err(JournalError::AllocatorExhausted { limit: 1 })
        ));
    }

    #[test]
    fn hint_past_limit_is_exhausted() {
        let dir = tempdir().unwrap();
        let result = allocate(dir.path(), 8, 7);
        assert!(matches!(result, Err(JournalError::AllocatorExhausted { .. })));
    }

    #[test]
    fn missing_journal_dir_is_io_error() {
        let dir = tempdir().unwrap();
        let result = allocate(&dir.path().join("missing"), 0, u64::MAX);
        assert!(matches!(result, Err(JournalError::Io(_))));
    }

    #[test]
    fn concurrent_allocations_are_unique() {
        let dir = tempdir().unwrap();
        let ids = Mutex::new(HashSet::new());

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..10 {
                        let alloc = allocate(dir.path(), 0, u64::MAX).unwrap();
                        assert!(ids.lock().unwrap().insert(alloc.id));
                    }
                });
            }
        });

        let ids = ids.into_inner().unwrap();
        assert_eq!(ids.len(), 80);
        assert!((0..80).all(|i| ids.contains(&EventId(i))));
    }
}
