use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use trainer_core::model::SessionId;

use crate::repository::{Snapshot, SnapshotStore, StorageError};

const SNAPSHOT_FILE: &str = "trainer_state_v1.json";
const APPLIED_FILE: &str = "applied_session_v1.json";

/// File-backed snapshot store: two JSON documents under one directory, one
/// for the state snapshot and one for the applied-session marker.
///
/// Corrupt or missing documents load as `None` so a damaged file degrades to
/// fresh defaults instead of wedging boot. Writes go through a temp file and
/// rename so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    fn applied_path(&self) -> PathBuf {
        self.dir.join(APPLIED_FILE)
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &Path,
    ) -> Result<Option<T>, StorageError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt document, loading defaults");
                Ok(None)
            }
        }
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_vec_pretty(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).map_err(|e| StorageError::Io(e.to_string()))?;
        file.write_all(&raw)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        self.read_json(&self.snapshot_path())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        self.write_json(&self.snapshot_path(), snapshot)
    }

    fn applied_session(&self) -> Result<Option<SessionId>, StorageError> {
        self.read_json(&self.applied_path())
    }

    fn set_applied_session(&self, id: SessionId) -> Result<(), StorageError> {
        self.write_json(&self.applied_path(), &id)
    }
}
