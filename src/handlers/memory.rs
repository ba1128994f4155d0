//! In-memory handler for tests and inspection

use crate::core::{Handler, LogEntry, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps every entry it is given.
///
/// Because it holds on to entries, it reports itself asynchronous and so
/// always receives entries the pools will never reclaim.
#[derive(Debug, Default)]
pub struct MemoryHandler {
    entries: Mutex<Vec<Arc<LogEntry>>>,
}

impl MemoryHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the entries received so far, oldest first.
    pub fn entries(&self) -> Vec<Arc<LogEntry>> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove and return everything received so far.
    pub fn take(&self) -> Vec<Arc<LogEntry>> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl Handler for MemoryHandler {
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()> {
        self.entries.lock().push(Arc::clone(entry));
        Ok(())
    }

    fn is_asynchronous(&self) -> bool {
        true
    }
}
