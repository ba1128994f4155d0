//! Handler that filters by its own level before forwarding

use crate::core::{Handler, LogEntry, LogLevel, Result};
use std::sync::Arc;

/// Forwards only entries at or above `level` to the wrapped handler.
///
/// Lets one sink in a [`MultiHandler`](super::MultiHandler) be stricter
/// than the logger itself.
pub struct LevelHandler<H> {
    level: LogLevel,
    handler: H,
}

impl<H: Handler> LevelHandler<H> {
    pub fn new(handler: H, level: LogLevel) -> Self {
        Self { level, handler }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn inner(&self) -> &H {
        &self.handler
    }
}

impl<H: Handler> Handler for LevelHandler<H> {
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()> {
        if entry.level < self.level {
            return Ok(());
        }
        self.handler.handle(entry)
    }

    fn is_asynchronous(&self) -> bool {
        self.handler.is_asynchronous()
    }

    fn flush(&self) -> Result<()> {
        self.handler.flush()
    }
}
