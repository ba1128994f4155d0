//! Main logger implementation

use super::{
    args::Arg,
    clock::{Clock, SystemClock},
    entry::Entry,
    error::{LoggerError, Result},
    error_value::ErrorValue,
    field::{FieldValue, Fielder},
    handler::Handler,
    log_entry::{LogEntry, Origin},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    pool::Pools,
};
use crate::handlers::DiscardHandler;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Duration;

/// Callback receiving handler failures in place of the stderr fallback.
pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Level-gated front end for one [`Handler`].
///
/// The handler, threshold and clock are fixed once the logger is built;
/// logging only reads them, so a logger can be shared between threads
/// by reference or behind an `Arc`.
pub struct Logger {
    handler: Arc<dyn Handler>,
    min_level: LogLevel,
    clock: Arc<dyn Clock>,
    pools: Arc<Pools>,
    /// Metrics for observability (emitted, filtered, failed)
    metrics: LoggerMetrics,
    on_handler_error: Option<ErrorCallback>,
}

macro_rules! level_methods {
    ($($plain:ident, $kv:ident, $fmt:ident;)*) => {
        $(
            #[inline]
            pub fn $plain(&self, msg: &str) {
                self.entry().$plain(msg);
            }

            #[inline]
            pub fn $kv<I>(&self, msg: &str, args: I)
            where
                I: IntoIterator<Item = Arg>,
            {
                self.entry().$kv(msg, args);
            }

            #[inline]
            pub fn $fmt(&self, args: fmt::Arguments<'_>) {
                self.entry().$fmt(args);
            }
        )*
    };
}

impl Logger {
    /// A logger writing entries at or above `min_level` to `handler`.
    #[must_use]
    pub fn new<H: Handler + 'static>(handler: H, min_level: LogLevel) -> Self {
        Self::builder().handler(handler).min_level(min_level).build()
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn pools(&self) -> &Arc<Pools> {
        &self.pools
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use fieldlog::{handlers::DiscardHandler, LogLevel, Logger};
    ///
    /// let logger = Logger::new(DiscardHandler, LogLevel::Info);
    /// logger.debug("ignored");
    /// logger.info("kept");
    ///
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.emitted_count(), 1);
    /// assert_eq!(metrics.filtered_count(), 1);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// An empty pooled entry bound to this logger.
    pub fn entry(&self) -> Entry<'_> {
        Entry::pooled(self)
    }

    /// Finalize `entry` at `level` with `message` and hand it to the
    /// handler.
    ///
    /// Entries below the threshold are dropped without reaching the
    /// handler. Handler failures go to the error callback, or to stderr
    /// when none is set; they never reach the caller.
    pub fn log(&self, level: LogLevel, entry: &Entry<'_>, message: fmt::Arguments<'_>) {
        if level < self.min_level {
            self.metrics.record_filtered();
            return;
        }

        let asynchronous = self.handler.is_asynchronous();
        let mut finalized = if asynchronous {
            Arc::new(LogEntry::empty(Origin::Retained))
        } else {
            self.pools.entries.acquire()
        };
        match Arc::get_mut(&mut finalized) {
            Some(target) => self.finalize(target, level, entry, message),
            None => {
                let mut target = LogEntry::empty(Origin::Retained);
                self.finalize(&mut target, level, entry, message);
                finalized = Arc::new(target);
            }
        }

        self.metrics.record_emitted();
        if let Err(err) = self.handler.handle(&finalized) {
            self.metrics.record_failed();
            self.report(&err);
        }

        if !asynchronous {
            self.pools.entries.release(finalized, &self.pools.fields);
        }
    }

    fn finalize(
        &self,
        target: &mut LogEntry,
        level: LogLevel,
        entry: &Entry<'_>,
        message: fmt::Arguments<'_>,
    ) {
        for layer in entry.layers() {
            target.fields.extend_from(layer);
        }
        target.level = level;
        target.message.clear();
        if target.message.write_fmt(message).is_err() {
            target.message.push_str("<unformattable message>");
        }
        target.timestamp = self.clock.now();
    }

    /// Flush the handler.
    ///
    /// Buffered handlers (a `JsonHandler` over a `BufWriter`, for one)
    /// hold entries until this is called or the writer is dropped.
    pub fn flush(&self) -> Result<()> {
        self.handler.flush()
    }

    /// Flush on the way out of the process; failures go to the error
    /// callback or stderr.
    pub(crate) fn flush_before_exit(&self) {
        if let Err(err) = self.handler.flush() {
            self.report(&err);
        }
    }

    fn report(&self, err: &LoggerError) {
        match &self.on_handler_error {
            Some(callback) => callback(err),
            None => eprintln!("[LOGGER ERROR] Failed to handle entry: {}", err),
        }
    }

    #[must_use]
    pub fn with_fields<F: Fielder + ?Sized>(&self, fielder: &F) -> Entry<'_> {
        self.entry().with_fields(fielder)
    }

    #[must_use]
    pub fn with_field(&self, name: &str, value: impl Into<FieldValue>) -> Entry<'_> {
        self.entry().with_field(name, value)
    }

    #[must_use]
    pub fn with_duration(&self, duration: Duration) -> Entry<'_> {
        self.entry().with_duration(duration)
    }

    #[must_use]
    pub fn with_error<E: Into<ErrorValue>>(&self, err: Option<E>) -> Entry<'_> {
        self.entry().with_error(err)
    }

    /// Log a formatted message at `level`.
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.entry().logf(level, args);
    }

    level_methods! {
        trace, trace_kv, tracef;
        debug, debug_kv, debugf;
        info, info_kv, infof;
        warn, warn_kv, warnf;
        error, error_kv, errorf;
    }

    /// Log `msg` at fatal level, flush the handler, then exit the process
    /// with status 1.
    pub fn fatal(&self, msg: &str) -> ! {
        self.entry().fatal(msg)
    }

    pub fn fatal_kv<I>(&self, msg: &str, args: I) -> !
    where
        I: IntoIterator<Item = Arg>,
    {
        self.entry().fatal_kv(msg, args)
    }

    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.entry().fatalf(args)
    }

    /// Log `msg` at info level and return an entry timing the work that
    /// follows.
    #[must_use]
    pub fn watch(&self, msg: &str) -> Entry<'_> {
        self.entry().watch(msg)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .field("asynchronous", &self.handler.is_asynchronous())
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use fieldlog::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .handler(MemoryHandler::new())
///     .on_handler_error(Arc::new(|err| {
///         eprintln!("ALERT: {}", err);
///     }))
///     .build();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    handler: Option<Arc<dyn Handler>>,
    clock: Option<Arc<dyn Clock>>,
    pools: Option<Arc<Pools>>,
    on_handler_error: Option<ErrorCallback>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            handler: None,
            clock: None,
            pools: None,
            on_handler_error: None,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the handler; entries are discarded when none is given.
    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Set the time source used for timestamps and watch durations.
    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use private pools instead of the process-wide ones.
    #[must_use = "builder methods return a new value"]
    pub fn pools(mut self, pools: Arc<Pools>) -> Self {
        self.pools = Some(pools);
        self
    }

    /// Set a callback for handler failures
    ///
    /// Replaces the default `[LOGGER ERROR]` line on stderr.
    #[must_use = "builder methods return a new value"]
    pub fn on_handler_error(mut self, callback: ErrorCallback) -> Self {
        self.on_handler_error = Some(callback);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger {
            handler: self.handler.unwrap_or_else(|| Arc::new(DiscardHandler)),
            min_level: self.min_level,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            pools: self.pools.unwrap_or_else(Pools::global),
            metrics: LoggerMetrics::new(),
            on_handler_error: self.on_handler_error,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
