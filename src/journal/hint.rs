//! Allocator hint persistence.
//!
//! The hint file (`<root>/.journal/.hint`) holds the bare decimal of the
//! next ID worth trying. It is read once when a journal is opened and
//! written once when it is closed. The hint is advisory: a stale or
//! missing hint only costs extra mkdir attempts, never a duplicate ID.
//!
//! Each write goes to its own temporary file which is then renamed over
//! `.hint`, so a crash leaves either the old or the new value and handles
//! closing at the same time never trip over each other's temp files.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{JournalError, Result};
use super::{HINT_FILE_NAME, sync_dir};

fn hint_path(journal_dir: &Path) -> PathBuf {
    journal_dir.join(HINT_FILE_NAME)
}

/// Reads the persisted hint.
///
/// Returns `Ok(0)` if the file doesn't exist or is empty.
pub fn read_hint(journal_dir: &Path) -> Result<u64> {
    let mut raw = String::new();
    match File::open(hint_path(journal_dir)) {
        Ok(mut file) => {
            file.read_to_string(&mut raw)?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| JournalError::MalformedHint(trimmed.to_string()))
}

/// Replaces the persisted hint with `hint`.
pub fn write_hint(journal_dir: &Path, hint: u64, sync: bool) -> Result<()> {
    let path = hint_path(journal_dir);

    let mut builder = tempfile::Builder::new();
    builder.prefix(".hint.").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(super::JOURNAL_PERMISSION));
    }

    let mut tmp = builder.tempfile_in(journal_dir)?;
    tmp.write_all(hint.to_string().as_bytes())?;
    if sync {
        tmp.as_file().sync_all()?;
    }
    tmp.persist(&path).map_err(|e| e.error)?;

    if sync {
        sync_dir(journal_dir)?;
    }

    debug!(hint, path = %path.display(), "wrote journal hint");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    proptest! {
        #[test]
        fn write_read_roundtrip(hint in 0u64..1_000_000) {
            let dir = tempdir().unwrap();
            write_hint(dir.path(), hint, false).unwrap();
            prop_assert_eq!(read_hint(dir.path()).unwrap(), hint);
        }

        #[test]
        fn no_temp_file_remains(hint in 0u64..1000) {
            let dir = tempdir().unwrap();
            write_hint(dir.path(), hint, true).unwrap();
            prop_assert_eq!(entries(dir.path()), vec![".hint".to_string()]);
        }
    }

    #[test]
    fn read_nonexistent_returns_zero() {
        let dir = tempdir().unwrap();
        assert_eq!(read_hint(dir.path()).unwrap(), 0);
    }

    #[test]
    fn read_empty_file_returns_zero() {
        let dir = tempdir().unwrap();
        File::create(hint_path(dir.path())).unwrap();
        assert_eq!(read_hint(dir.path()).unwrap(), 0);
    }

    #[test]
    fn read_invalid_content_returns_error() {
        let dir = tempdir().unwrap();
        std::fs::write(hint_path(dir.path()), "not a number").unwrap();
        assert!(matches!(
            read_hint(dir.path()),
            Err(JournalError::MalformedHint(_))
        ));
    }

    #[test]
    fn write_is_bare_decimal() {
        let dir = tempdir().unwrap();
        write_hint(dir.path(), 3, false).unwrap();
        assert_eq!(std::fs::read(hint_path(dir.path())).unwrap(), b"3");
    }

    #[test]
    fn write_overwrites_longer_value() {
        let dir = tempdir().unwrap();
        write_hint(dir.path(), 12345, false).unwrap();
        write_hint(dir.path(), 7, false).unwrap();
        assert_eq!(std::fs::read(hint_path(dir.path())).unwrap(), b"7");
    }

    #[cfg(unix)]
    #[test]
    fn hint_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        write_hint(dir.path(), 1, false).unwrap();
        let mode = std::fs::metadata(hint_path(dir.path()))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn concurrent_writes_all_succeed() {
        let dir = tempdir().unwrap();

        for _ in 0..50 {
            std::thread::scope(|s| {
                for hint in 0..8u64 {
                    let path = dir.path();
                    s.spawn(move || write_hint(path, hint, false).unwrap());
                }
            });

            let value = read_hint(dir.path()).unwrap();
            assert!(value < 8);
            assert_eq!(entries(dir.path()), vec![".hint".to_string()]);
        }
    }
}
