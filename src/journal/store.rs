//! The journal handle: create, close and look up events.

use std::fs::OpenOptions;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::types::{Event, EventId};

use super::allocator::allocate;
use super::codec::{COMPLETE_FLAG, deserialize, serialize, validate_description};
use super::config::JournalConfig;
use super::error::{JournalError, Result};
use super::hint::{read_hint, write_hint};
use super::{JOURNAL_DIR_NAME, RECORD_FILE_NAME, journal_dir_builder, sync_dir};

/// In-memory bookkeeping for one journal handle.
#[derive(Debug)]
struct Bookkeeping {
    /// Lowest ID not known to be taken.
    hint: u64,
    /// Most recently created event this handle has not closed yet.
    active: Option<EventId>,
}

/// An open journal rooted at a directory.
///
/// All methods take `&self`, so one handle can be shared between threads.
/// The hint is only persisted by [`Journal::close`].
#[derive(Debug)]
pub struct Journal {
    root: PathBuf,
    dir: PathBuf,
    config: JournalConfig,
    state: Mutex<Bookkeeping>,
}

impl Journal {
    /// Opens the journal under `root` with the default configuration.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(root, JournalConfig::default())
    }

    /// Opens the journal under `root`, creating `<root>/.journal` if needed.
    ///
    /// A new journal starts with hint 0. An existing one loads its persisted
    /// hint instead of scanning; a missing hint file also means 0.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open_with_config(root: impl AsRef<Path>, config: JournalConfig) -> Result<Self> {
        config.validate()?;

        let root = root.as_ref().to_path_buf();
        let dir = root.join(JOURNAL_DIR_NAME);

        let hint = match journal_dir_builder().create(&dir) {
            Ok(()) => {
                debug!("created journal directory");
                0
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => read_hint(&dir)?,
            Err(e) => return Err(e.into()),
        };
        debug!(hint, "opened journal");

        Ok(Journal {
            root,
            dir,
            config,
            state: Mutex::new(Bookkeeping { hint, active: None }),
        })
    }

    /// The directory the journal was opened at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.journal` directory holding the events.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// The cached allocator hint.
    pub fn hint(&self) -> u64 {
        self.state.lock().hint
    }

    /// The event this handle created most recently and has not closed.
    pub fn active(&self) -> Option<EventId> {
        self.state.lock().active
    }

    pub(crate) fn record_path(&self, id: EventId) -> PathBuf {
        record_path(&self.dir, id)
    }

    /// Creates a new event and makes it the active one.
    ///
    /// The new event's overlap is whatever event was active before.
    #[instrument(skip_all)]
    pub fn create_event<I, S>(&self, description: I) -> Result<Event>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let description: Vec<String> = description.into_iter().map(Into::into).collect();
        validate_description(&description)?;

        let hint = self.state.lock().hint;
        let mut allocation = allocate(&self.dir, hint, self.config.max_id)?;

        let event = {
            let mut state = self.state.lock();
            // Concurrent creators may finish out of order.
            state.hint = state.hint.max(allocation.next_hint());
            let overlap = state.active.replace(allocation.id);
            Event::new(allocation.id, description, overlap)
        };

        let written = write_record(&mut allocation.record, &event).and_then(|()| {
            if self.config.sync_writes {
                allocation.record.sync_all()?;
                sync_dir(&self.dir)?;
            }
            Ok(())
        });
        if let Err(e) = written {
            self.abandon(&event);
            return Err(e.into());
        }

        debug!(event = %event.id(), overlap = ?event.overlap(), "created event");
        Ok(event)
    }

    /// Undoes the bookkeeping of an event whose record could not be written.
    ///
    /// The event directory stays behind so its ID is never handed out again.
    fn abandon(&self, event: &Event) {
        let mut state = self.state.lock();
        if state.active == Some(event.id()) {
            state.active = event.overlap();
        }
        warn!(event = %event.id(), "record write failed, leaving orphaned event directory");
    }

    /// Marks an event complete by patching the last byte of its record.
    ///
    /// Closing an event that is already complete does nothing. Fails with
    /// `NotFound` if the record has disappeared.
    #[instrument(skip_all, fields(event = %event.id()))]
    pub fn close_event(&self, event: &mut Event) -> Result<()> {
        if event.is_complete() {
            return Ok(());
        }

        {
            let mut state = self.state.lock();
            if state.active == Some(event.id()) {
                state.active = None;
            }
        }

        let path = self.record_path(event.id());
        let mut file = match OpenOptions::new().write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(JournalError::NotFound(event.id()));
            }
            Err(e) => return Err(e.into()),
        };

        let size = file.metadata()?.len();
        if size == 0 {
            return Err(JournalError::malformed(event.id(), "empty record"));
        }
        file.seek(SeekFrom::Start(size - 1))?;
        file.write_all(&[COMPLETE_FLAG])?;
        if self.config.sync_writes {
            file.sync_all()?;
        }

        event.mark_complete();
        debug!("closed event");
        Ok(())
    }

    /// Reads the event with the given ID from disk.
    pub fn get(&self, id: EventId) -> Result<Event> {
        read_event(&self.dir, id)
    }

    /// Looks up the event that was active when `event` was created.
    ///
    /// Returns `Ok(None)` for a top-level event.
    pub fn enclosing(&self, event: &Event) -> Result<Option<Event>> {
        match event.overlap() {
            Some(id) => self.get(id).map(Some),
            None => Ok(None),
        }
    }

    /// Persists the hint and releases the handle.
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn close(self) -> Result<()> {
        let hint = self.state.lock().hint;
        write_hint(&self.dir, hint, self.config.sync_writes)
    }
}

fn write_record(record: &mut impl Write, event: &Event) -> io::Result<()> {
    record.write_all(serialize(event).as_bytes())
}

fn record_path(journal_dir: &Path, id: EventId) -> PathBuf {
    journal_dir.join(id.to_string()).join(RECORD_FILE_NAME)
}

/// Reads and decodes the record of event `id`.
pub(crate) fn read_event(journal_dir: &Path, id: EventId) -> Result<Event> {
    let raw = match std::fs::read(record_path(journal_dir, id)) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(JournalError::NotFound(id)),
        Err(e) => return Err(e.into()),
    };
    deserialize(id, &raw)
}
