//! Snapshot storage sinks

use std::collections::HashMap;

/// Error type for snapshot persistence.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Invalid tab id in snapshot: {0}")]
    InvalidTabId(String),
    #[error("Storage backend failed: {0}")]
    Backend(String),
}

/// Key-value storage the snapshot is written to.
///
/// Writes are best-effort: the store logs a failed write and keeps its
/// in-memory state.
pub trait SnapshotSink {
    /// Read the stored snapshot, if any.
    fn load(&mut self, key: &str) -> Result<Option<String>, PersistError>;

    /// Replace the stored snapshot.
    fn store(&mut self, key: &str, snapshot: &str) -> Result<(), PersistError>;
}

/// In-memory sink, used by tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: HashMap<String, String>,
    writes: usize,
    fail_writes: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink pre-populated with a stored snapshot.
    pub fn with_record(key: &str, snapshot: &str) -> Self {
        let mut sink = Self::new();
        sink.records.insert(key.to_string(), snapshot.to_string());
        sink
    }

    /// Make every subsequent write fail.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(|s| s.as_str())
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SnapshotSink for MemorySink {
    fn load(&mut self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.records.get(key).cloned())
    }

    fn store(&mut self, key: &str, snapshot: &str) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::Backend("write rejected".to_string()));
        }
        self.records.insert(key.to_string(), snapshot.to_string());
        self.writes += 1;
        Ok(())
    }
}
