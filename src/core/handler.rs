//! Handler trait for log output destinations

use super::{error::Result, log_entry::LogEntry};
use std::fmt;
use std::sync::Arc;

/// A sink for finalized entries.
///
/// A handler that keeps the entry beyond `handle` (cloning the `Arc`,
/// queueing it for later) must return `true` from
/// [`is_asynchronous`](Handler::is_asynchronous). The logger then hands it
/// an entry that is never reclaimed by the entry pool. Synchronous
/// handlers receive pooled entries that are recycled as soon as `handle`
/// returns, so they must not hold on to them.
pub trait Handler: Send + Sync {
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()>;

    /// Whether this handler retains entries past the call that delivered
    /// them.
    fn is_asynchronous(&self) -> bool {
        false
    }

    /// Push anything the handler buffered to its destination.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()> {
        (**self).handle(entry)
    }

    fn is_asynchronous(&self) -> bool {
        (**self).is_asynchronous()
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()> {
        (**self).handle(entry)
    }

    fn is_asynchronous(&self) -> bool {
        (**self).is_asynchronous()
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Adapts a closure into a synchronous [`Handler`].
///
/// ```
/// use fieldlog::{HandlerFn, LogLevel, Logger};
///
/// let logger = Logger::new(
///     HandlerFn::new(|entry| {
///         println!("{}", entry.message);
///         Ok(())
///     }),
///     LogLevel::Info,
/// );
/// logger.info("hello");
/// ```
pub struct HandlerFn<F> {
    func: F,
}

impl<F> HandlerFn<F>
where
    F: Fn(&LogEntry) -> Result<()> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&LogEntry) -> Result<()> + Send + Sync,
{
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()> {
        (self.func)(entry)
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFn")
    }
}
