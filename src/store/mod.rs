//! Durable single-slot storage for the open position.
//!
//! The record is one pretty-printed JSON file. Writes go to a temporary file in the
//! same directory which is then renamed over the target, so a crash mid-write leaves
//! either the old record or the new one.

use crate::domain::Position;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("position record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("position file I/O failed: {0}")]
    IoFailure(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored position. Corrupt or unreadable records are logged and treated as
    /// absent.
    pub fn load(&self) -> Option<Position> {
        match self.try_load() {
            Ok(position) => position,
            Err(e) => {
                warn!("Ignoring position file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn try_load(&self) -> Result<Option<Position>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn save(&self, position: &Position) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, position).map_err(io::Error::from)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Saved position to {}", self.path.display());
        Ok(())
    }

    /// Remove the stored position. Deleting a missing record is not an error.
    pub fn delete(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::tests::sample_position;
    use tempfile::TempDir;

    fn setup_store() -> (PositionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = PositionStore::new(temp_dir.path().join("position.json"));
        (store, temp_dir)
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let (store, _temp) = setup_store();
        assert!(store.try_load().unwrap().is_none());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let (store, _temp) = setup_store();
        let position = sample_position();

        store.save(&position).unwrap();
        assert_eq!(store.load(), Some(position.clone()));

        let mut updated = position;
        updated.pnl_percent = 12.5;
        store.save(&updated).unwrap();
        assert_eq!(store.load().unwrap().pnl_percent, 12.5);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (store, temp) = setup_store();
        store.save(&sample_position()).unwrap();
        store.save(&sample_position()).unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_corrupt_record_is_treated_as_absent() {
        let (store, _temp) = setup_store();
        fs::write(store.path(), b"{\"token_address\": \"abc\", ").unwrap();

        assert!(matches!(store.try_load(), Err(StoreError::Corrupt(_))));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (store, _temp) = setup_store();
        store.save(&sample_position()).unwrap();

        store.delete().unwrap();
        assert!(store.load().is_none());
        store.delete().unwrap();
    }
}
