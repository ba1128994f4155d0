//! Fan-out handler

use crate::core::{Handler, LogEntry, Result};
use std::sync::Arc;

/// Delivers each entry to several handlers in registration order.
///
/// Delivery stops at the first child that fails and that failure is
/// returned; later children do not see the entry. The fan-out is
/// asynchronous when any child is, so retaining children always receive
/// entries the pools will not reclaim.
pub struct MultiHandler {
    handlers: Vec<Box<dyn Handler>>,
    asynchronous: bool,
}

impl MultiHandler {
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        let asynchronous = handlers.iter().any(|h| h.is_asynchronous());
        Self {
            handlers,
            asynchronous,
        }
    }

    /// Append a child; it receives entries after every existing one.
    #[must_use]
    pub fn with<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.asynchronous |= handler.is_asynchronous();
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for MultiHandler {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Handler for MultiHandler {
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()> {
        for handler in &self.handlers {
            handler.handle(entry)?;
        }
        Ok(())
    }

    fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }

    /// Flushes every child, even after one fails; the first failure is
    /// returned.
    fn flush(&self) -> Result<()> {
        let mut first = None;
        for handler in &self.handlers {
            if let Err(err) = handler.flush() {
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
