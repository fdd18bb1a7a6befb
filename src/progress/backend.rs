//! Persistence collaborator
//!
//! Progress is stored as one JSON document per namespace. The store only
//! needs `read` and `write`; how the document lands on disk is up to the
//! backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

/// Namespace holding achievements and score history
pub const USER_NAMESPACE: &str = "user";

/// Namespace owned by the settings UI.
///
/// Part of the storage layout every backend shares with front ends; the
/// progress store never reads or writes it.
pub const SETTINGS_NAMESPACE: &str = "settings";

/// Error type for persistence backends
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value storage of JSON documents
pub trait ProgressBackend: Send + Sync + 'static {
    /// Read a namespace. `Ok(None)` when nothing was stored yet.
    fn read(&self, namespace: &str) -> Result<Option<Value>, BackendError>;

    /// Replace the document stored under a namespace
    fn write(&self, namespace: &str, data: &Value) -> Result<(), BackendError>;
}

/// Process-local backend.
///
/// Used for ephemeral sessions and for simulating storage failures.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<String, Value>>,
    fail_reads: AtomicBool,
    failing_writes: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with one document
    pub fn with_document(namespace: &str, data: Value) -> Self {
        let backend = Self::default();
        backend
            .documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(namespace.to_string(), data);
        backend
    }

    /// Make every read fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` writes fail
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current document of a namespace, bypassing failure simulation
    pub fn document(&self, namespace: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(namespace)
            .cloned()
    }
}

impl ProgressBackend for MemoryBackend {
    fn read(&self, namespace: &str) -> Result<Option<Value>, BackendError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!(
                "simulated read failure for '{}'",
                namespace
            )));
        }
        Ok(self.document(namespace))
    }

    fn write(&self, namespace: &str, data: &Value) -> Result<(), BackendError> {
        let failing = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(BackendError::Unavailable(format!(
                "simulated write failure for '{}'",
                namespace
            )));
        }

        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(namespace.to_string(), data.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
