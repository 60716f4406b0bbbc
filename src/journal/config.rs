//! Journal configuration.

use super::error::{JournalError, Result};

/// Default number of workers used to load records during a scan.
pub const DEFAULT_SCAN_WORKERS: usize = 5;

/// Default allocator limit. IDs must stay representable in the signed
/// overlap field of a record.
pub const DEFAULT_MAX_ID: u64 = i64::MAX as u64;

/// Tunables for a [`Journal`](super::Journal) instance.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Number of worker threads loading records during a scan.
    ///
    /// Bounds the number of record files open at once. Default: 5.
    pub scan_workers: usize,

    /// Highest ID the allocator will hand out.
    ///
    /// Allocation past this fails with `AllocatorExhausted`.
    pub max_id: u64,

    /// Whether to fsync records after creation and after the completion
    /// patch, and to fsync the hint file and its directory on close.
    ///
    /// Default: `false`.
    pub sync_writes: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalConfig {
    /// Creates a new `JournalConfig` with default values.
    pub fn new() -> Self {
        JournalConfig {
            scan_workers: DEFAULT_SCAN_WORKERS,
            max_id: DEFAULT_MAX_ID,
            sync_writes: false,
        }
    }

    pub fn with_scan_workers(mut self, workers: usize) -> Self {
        self.scan_workers = workers;
        self
    }

    pub fn with_max_id(mut self, max_id: u64) -> Self {
        self.max_id = max_id;
        self
    }

    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.scan_workers == 0 {
            return Err(JournalError::InvalidArgument(
                "scan_workers must be at least 1".into(),
            ));
        }
        if self.max_id > DEFAULT_MAX_ID {
            return Err(JournalError::InvalidArgument(format!(
                "max_id {} does not fit in a record's overlap field",
                self.max_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = JournalConfig::default();
        assert_eq!(config.scan_workers, 5);
        assert_eq!(config.max_id, i64::MAX as u64);
        assert!(!config.sync_writes);
        config.validate().unwrap();
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = JournalConfig::new().with_scan_workers(0);
        assert!(matches!(
            config.validate(),
            Err(JournalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn max_id_beyond_signed_range_is_rejected() {
        let config = JournalConfig::new().with_max_id(u64::MAX);
        assert!(matches!(
            config.validate(),
            Err(JournalError::InvalidArgument(_))
        ));
    }
}
