//! JSON file store implementation

use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{StoreError, StoreResult, UsageSnapshot, UsageStore};

/// Stores the usage snapshot as a single JSON document.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target, so readers see either the old or the new file.
pub struct JsonFileStore {
    path: PathBuf,
    healthy: AtomicBool,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            healthy: AtomicBool::new(true),
        }
    }

    fn record<T>(&self, result: StoreResult<T>) -> StoreResult<T> {
        self.healthy.store(result.is_ok(), Ordering::Relaxed);
        result
    }

    fn read(&self) -> StoreResult<Option<UsageSnapshot>> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&content)?))
    }

    fn write(&self, snapshot: &UsageSnapshot) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, snapshot)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::Io(e.error))?;

        debug!(
            path = %self.path.display(),
            date = %snapshot.date,
            seconds_today = snapshot.seconds_today,
            "Saved usage snapshot"
        );
        Ok(())
    }
}

impl UsageStore for JsonFileStore {
    fn load_usage(&self) -> StoreResult<Option<UsageSnapshot>> {
        let result = self.read();
        self.record(result)
    }

    fn save_usage(&self, snapshot: &UsageSnapshot) -> StoreResult<()> {
        let result = self.write(snapshot);
        self.record(result)
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert!(store.load_usage().unwrap().is_none());
        assert!(store.is_healthy());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let store = JsonFileStore::new(&path);

        let snapshot = UsageSnapshot {
            date: day(25),
            seconds_today: 1234.5,
        };
        store.save_usage(&snapshot).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load_usage().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_save_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        store.save_usage(&UsageSnapshot::empty(day(24))).unwrap();
        let newer = UsageSnapshot {
            date: day(25),
            seconds_today: 60.0,
        };
        store.save_usage(&newer).unwrap();

        assert_eq!(store.load_usage().unwrap(), Some(newer));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "temporary files must not be left behind");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load_usage(), Err(StoreError::Corrupt(_))));
        assert!(!store.is_healthy());
    }

    #[test]
    fn test_unwritable_location_marks_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        // Parent "directory" is a regular file
        let store = JsonFileStore::new(blocker.join("state.json"));
        assert!(store.save_usage(&UsageSnapshot::empty(day(25))).is_err());
        assert!(!store.is_healthy());
    }
}
