use std::fs;
use std::path::PathBuf;

use log::warn;
use serde_json::{Map, Value};

use fl_core::{PersistError, SnapshotSink};

/// Snapshot sink backed by a JSON file laid out like extension storage:
/// `{ "<storage key>": <snapshot> }`.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<Map<String, Value>, PersistError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| PersistError::Backend(format!("Failed to read '{}': {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(PersistError::Decode)
    }
}

impl SnapshotSink for FileSink {
    fn load(&mut self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.read_all()?.get(key).map(Value::to_string))
    }

    fn store(&mut self, key: &str, snapshot: &str) -> Result<(), PersistError> {
        // An unreadable file is replaced so later writes can recover
        let mut records = match self.read_all() {
            Ok(records) => records,
            Err(e) => {
                warn!("Overwriting unreadable state file '{}': {}", self.path.display(), e);
                Map::new()
            }
        };
        let value: Value = serde_json::from_str(snapshot).map_err(PersistError::Encode)?;
        records.insert(key.to_string(), value);

        let json = serde_json::to_string_pretty(&records).map_err(PersistError::Encode)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PersistError::Backend(format!("Failed to create '{}': {}", parent.display(), e)))?;
        }
        fs::write(&self.path, json)
            .map_err(|e| PersistError::Backend(format!("Failed to write '{}': {}", self.path.display(), e)))
    }
}
