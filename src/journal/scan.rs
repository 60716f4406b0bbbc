//! Parallel listing of every event in a journal.
//!
//! Every numbered directory under the journal is loaded by a fixed pool of
//! workers fed from a bounded queue, which caps the number of record files
//! open at once. A single collector gathers the decoded events. The scan
//! is all-or-nothing: the first failed load aborts it and nothing partial is
//! returned.
//!
//! Nothing is cached between scans; every call re-reads the directory tree.

use std::panic;
use std::path::Path;
use std::thread;

use crossbeam_channel::bounded;
use tracing::{debug, instrument, trace};

use crate::types::{Event, EventId};

use super::error::Result;
use super::store::{Journal, read_event};

/// Loads every event under `journal_dir` using `workers` loader threads.
///
/// The result is sorted by ID, independent of directory listing order and
/// of the order in which workers finish.
pub fn scan_events(journal_dir: &Path, workers: usize) -> Result<Vec<Event>> {
    let candidates = list_candidates(journal_dir)?;
    let mut events = load_parallel(journal_dir, candidates, workers)?;
    events.sort_by_key(Event::id);
    Ok(events)
}

/// Lists the IDs of every event directory. Other entries are skipped.
fn list_candidates(journal_dir: &Path) -> Result<Vec<EventId>> {
    let mut ids = Vec::new();

    for entry in std::fs::read_dir(journal_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name();
        match name.to_str().and_then(EventId::from_dir_name) {
            Some(id) => ids.push(id),
            None => trace!(name = ?name, "skipping non-event directory"),
        }
    }

    Ok(ids)
}

fn load_parallel(journal_dir: &Path, ids: Vec<EventId>, workers: usize) -> Result<Vec<Event>> {
    let (work_tx, work_rx) = bounded::<EventId>(workers);
    let (result_tx, result_rx) = bounded::<Result<Event>>(workers);

    thread::scope(|s| {
        // Returning early drops the receiver, which stops the loaders.
        let collector = s.spawn(move || -> Result<Vec<Event>> {
            let mut events = Vec::new();
            for result in result_rx {
                events.push(result?);
            }
            Ok(events)
        });

        let loaders: Vec<_> = (0..workers)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || {
                    for id in work_rx {
                        trace!(event = %id, "loading event");
                        let result = read_event(journal_dir, id);
                        let failed = result.is_err();
                        if result_tx.send(result).is_err() || failed {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(work_rx);
        drop(result_tx);

        for id in ids {
            // Fails only once every loader has stopped.
            if work_tx.send(id).is_err() {
                break;
            }
        }
        drop(work_tx);

        for loader in loaders {
            if let Err(payload) = loader.join() {
                panic::resume_unwind(payload);
            }
        }
        match collector.join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}

impl Journal {
    /// Every event in the journal, sorted by ID.
    #[instrument(skip_all, fields(root = %self.root().display()))]
    pub fn list_events(&self) -> Result<Vec<Event>> {
        let events = scan_events(self.path(), self.config().scan_workers)?;
        debug!(count = events.len(), "scanned journal");
        Ok(events)
    }

    /// Events that have not been closed yet, sorted by ID.
    pub fn running_events(&self) -> Result<Vec<Event>> {
        Ok(self
            .list_events()?
            .into_iter()
            .filter(|e| !e.is_complete())
            .collect())
    }

    /// Events created while another event was active, sorted by ID.
    pub fn overlapping_events(&self) -> Result<Vec<Event>> {
        Ok(self
            .list_events()?
            .into_iter()
            .filter(Event::is_overlapping)
            .collect())
    }

    /// Number of events in the journal.
    pub fn count(&self) -> Result<usize> {
        Ok(self.list_events()?.len())
    }
}
