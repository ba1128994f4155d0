//! In-flight log entries
//!
//! An [`Entry`] accumulates field batches for a future log call. Every
//! `with_*` call returns a new entry holding the receiver's batches plus
//! one more; batches are immutable once attached and shared by `Arc`
//! between derived entries, so deriving never copies field data.
//!
//! Entries created by a [`Logger`]'s own methods are pooled: when such an
//! entry goes out of scope, every batch it alone still references hands
//! its fields back to the field pool. Entries built with [`Entry::new`]
//! never touch the pool.

use super::args::{parse_kv, Arg};
use super::clock::elapsed_millis;
use super::error_value::{ErrorValue, StructuredError};
use super::field::{Field, FieldValue, Fielder, Fields};
use super::log_level::LogLevel;
use super::logger::Logger;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Entry<'a> {
    logger: Option<&'a Logger>,
    layers: Vec<Arc<Fields>>,
    message: Option<String>,
    start: Option<DateTime<Utc>>,
    pooled: bool,
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $kv:ident, $fmt:ident;)*) => {
        $(
            #[doc = concat!("Log `msg` at ", stringify!($level), " level.")]
            pub fn $plain(&self, msg: &str) {
                self.emit(LogLevel::$level, format_args!("{}", msg));
            }

            #[doc = concat!("Log `msg` at ", stringify!($level), " level with key/value arguments.")]
            pub fn $kv<I>(&self, msg: &str, args: I)
            where
                I: IntoIterator<Item = Arg>,
            {
                self.with_kv(args).emit(LogLevel::$level, format_args!("{}", msg));
            }

            #[doc = concat!("Log a formatted message at ", stringify!($level), " level.")]
            pub fn $fmt(&self, args: fmt::Arguments<'_>) {
                self.emit(LogLevel::$level, args);
            }
        )*
    };
}

impl<'a> Entry<'a> {
    /// An entry bound to `logger` that is never recycled.
    ///
    /// Safe to keep for as long as the logger lives.
    pub fn new(logger: &'a Logger) -> Self {
        Self::bound(Some(logger), false)
    }

    pub(crate) fn pooled(logger: &'a Logger) -> Self {
        Self::bound(Some(logger), true)
    }

    fn bound(logger: Option<&'a Logger>, pooled: bool) -> Self {
        Self {
            logger,
            layers: Vec::new(),
            message: None,
            start: None,
            pooled,
        }
    }

    pub fn logger(&self) -> Option<&'a Logger> {
        self.logger
    }

    pub fn is_pooled(&self) -> bool {
        self.pooled
    }

    /// Message recorded by [`watch`](Entry::watch).
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Start time recorded by [`watch`](Entry::watch).
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// Number of attached field batches.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub(crate) fn layers(&self) -> &[Arc<Fields>] {
        &self.layers
    }

    /// All attached fields in attachment order.
    pub fn fields(&self) -> Fields {
        let mut out = Fields::with_capacity(self.layers.iter().map(|l| l.len()).sum());
        for layer in &self.layers {
            out.extend_from(layer);
        }
        out
    }

    fn derive(&self, layer: Fields) -> Entry<'a> {
        let mut layers = Vec::with_capacity(self.layers.len() + 1);
        layers.extend(self.layers.iter().cloned());
        layers.push(Arc::new(layer));
        Entry {
            logger: self.logger,
            layers,
            message: None,
            start: None,
            pooled: self.pooled,
        }
    }

    fn new_field(&self, name: &str, value: FieldValue) -> Arc<Field> {
        match self.logger {
            Some(logger) => logger.pools().fields.acquire(name, value),
            None => Arc::new(Field {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// A new entry with every field `fielder` contributes.
    #[must_use]
    pub fn with_fields<F: Fielder + ?Sized>(&self, fielder: &F) -> Entry<'a> {
        self.derive(fielder.fields())
    }

    /// A new entry with the field `name` set to `value`.
    #[must_use]
    pub fn with_field(&self, name: &str, value: impl Into<FieldValue>) -> Entry<'a> {
        let mut layer = Fields::with_capacity(1);
        layer.push_shared(self.new_field(name, value.into()));
        self.derive(layer)
    }

    /// A new entry with a `"duration"` field in whole milliseconds.
    #[must_use]
    pub fn with_duration(&self, duration: Duration) -> Entry<'a> {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        self.with_field("duration", millis)
    }

    /// A new entry describing `err`, or a copy of this one when there is
    /// no error.
    ///
    /// Adds `"error"` with the error's message, then `"source"` when the
    /// error knows its first stack frame, then the error's own fields.
    /// Use [`ErrorValue::structured`] to pass those optional parts along.
    #[must_use]
    pub fn with_error<E: Into<ErrorValue>>(&self, err: Option<E>) -> Entry<'a> {
        let err = match err {
            Some(err) => err.into(),
            None => return self.clone(),
        };

        let mut layer = Fields::with_capacity(2);
        layer.push_shared(self.new_field("error", FieldValue::from(err.message())));
        if let Some(frame) = err.frame() {
            layer.push_shared(self.new_field("source", FieldValue::String(frame.to_string())));
        }
        let ctx = self.derive(layer);

        match err.fields() {
            Some(fields) => ctx.with_fields(fields),
            None => ctx,
        }
    }

    fn with_kv<I>(&self, args: I) -> Entry<'a>
    where
        I: IntoIterator<Item = Arg>,
    {
        let logger = match self.logger {
            Some(logger) => logger,
            None => return self.clone(),
        };
        let fields = parse_kv(args, &logger.pools().fields);
        if fields.is_empty() {
            self.clone()
        } else {
            self.derive(fields)
        }
    }

    fn emit(&self, level: LogLevel, message: fmt::Arguments<'_>) {
        if let Some(logger) = self.logger {
            logger.log(level, self, message);
        }
    }

    /// Log a formatted message at `level`.
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.emit(level, args);
    }

    level_methods! {
        Trace => trace, trace_kv, tracef;
        Debug => debug, debug_kv, debugf;
        Info => info, info_kv, infof;
        Warn => warn, warn_kv, warnf;
        Error => error, error_kv, errorf;
    }

    /// Log `msg` at fatal level, flush the handler, then exit the process
    /// with status 1.
    pub fn fatal(&self, msg: &str) -> ! {
        self.emit(LogLevel::Fatal, format_args!("{}", msg));
        self.exit()
    }

    /// Log `msg` with key/value arguments at fatal level, flush the
    /// handler, then exit the process with status 1.
    pub fn fatal_kv<I>(&self, msg: &str, args: I) -> !
    where
        I: IntoIterator<Item = Arg>,
    {
        self.with_kv(args)
            .emit(LogLevel::Fatal, format_args!("{}", msg));
        self.exit()
    }

    /// Log a formatted message at fatal level, flush the handler, then exit
    /// the process with status 1.
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.emit(LogLevel::Fatal, args);
        self.exit()
    }

    // process::exit skips destructors, so buffered writers are drained here
    fn exit(&self) -> ! {
        if let Some(logger) = self.logger {
            logger.flush_before_exit();
        }
        std::process::exit(1)
    }

    /// Log `msg` at info level and return an entry that times the work
    /// that follows; finish it with [`stop`](Entry::stop).
    ///
    /// ```
    /// use fieldlog::{handlers::MemoryHandler, LogLevel, Logger};
    /// use std::sync::Arc;
    ///
    /// let memory = Arc::new(MemoryHandler::new());
    /// let logger = Logger::new(Arc::clone(&memory), LogLevel::Info);
    ///
    /// let watch = logger.with_field("file", "sloth.png").watch("upload");
    /// watch.stop(None::<&std::io::Error>);
    ///
    /// let entries = memory.entries();
    /// assert_eq!(entries.len(), 2);
    /// assert!(entries[1].fields.get("duration").is_some());
    /// ```
    #[must_use]
    pub fn watch(&self, msg: &str) -> Entry<'a> {
        self.info(msg);
        let start = match self.logger {
            Some(logger) => logger.clock().now(),
            None => Utc::now(),
        };
        Entry {
            logger: self.logger,
            layers: self.layers.clone(),
            message: Some(msg.to_string()),
            start: Some(start),
            pooled: self.pooled,
        }
    }

    /// Log the completion of watched work.
    ///
    /// Without an error the watch message is logged again at info level
    /// with a `"duration"` field; with one it is logged at error level
    /// with `"duration"` and `"error"`.
    ///
    /// A plain `&E` contributes only its message. Pass an
    /// [`ErrorValue::structured`] or use
    /// [`stop_structured`](Entry::stop_structured) to also record the
    /// error's `"source"` frame and extra fields.
    pub fn stop<E: Into<ErrorValue>>(&self, err: Option<E>) {
        let now = match self.logger {
            Some(logger) => logger.clock().now(),
            None => Utc::now(),
        };
        let millis = elapsed_millis(self.start.unwrap_or(now), now);
        let msg = self.message.as_deref().unwrap_or_default();

        let done = self.with_field("duration", millis);
        match err {
            None => done.info(msg),
            Some(err) => done.with_error(Some(err)).error(msg),
        }
    }

    /// [`stop`](Entry::stop) with every capability `err` exposes.
    pub fn stop_structured<E: StructuredError + ?Sized>(&self, err: Option<&E>) {
        self.stop(err.map(ErrorValue::structured));
    }

    /// [`stop`](Entry::stop) with the error of `result`, if any.
    ///
    /// Only the error's message is recorded; see
    /// [`finish_structured`](Entry::finish_structured).
    pub fn finish<T, E>(&self, result: &std::result::Result<T, E>)
    where
        E: std::error::Error,
    {
        self.stop(result.as_ref().err());
    }

    /// [`finish`](Entry::finish) recording the error's `"source"` frame
    /// and extra fields as well.
    pub fn finish_structured<T, E>(&self, result: &std::result::Result<T, E>)
    where
        E: StructuredError,
    {
        self.stop_structured(result.as_ref().err());
    }
}

/// An entry bound to no logger; logging through it does nothing.
impl Default for Entry<'_> {
    fn default() -> Self {
        Self::bound(None, false)
    }
}

impl Drop for Entry<'_> {
    fn drop(&mut self) {
        if !self.pooled {
            return;
        }
        let logger = match self.logger {
            Some(logger) => logger,
            None => return,
        };
        let fields = &logger.pools().fields;
        for layer in self.layers.drain(..) {
            if let Ok(mut layer) = Arc::try_unwrap(layer) {
                for field in layer.drain_shared() {
                    fields.release(field);
                }
            }
        }
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("fields", &self.fields())
            .field("message", &self.message)
            .field("start", &self.start)
            .field("pooled", &self.pooled)
            .finish()
    }
}
