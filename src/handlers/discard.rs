//! Handler that drops every entry

use crate::core::{Handler, LogEntry, Result};
use std::sync::Arc;

/// Accepts and discards everything. Used when a logger is built without
/// a handler, and for benchmarking the logging path itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardHandler;

impl Handler for DiscardHandler {
    #[inline]
    fn handle(&self, _entry: &Arc<LogEntry>) -> Result<()> {
        Ok(())
    }
}
