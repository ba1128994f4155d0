//! Core logger types and traits

pub mod args;
pub mod clock;
pub mod entry;
pub mod error;
pub mod error_value;
pub mod field;
pub mod handler;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod pool;
pub mod timestamp;

pub use args::Arg;
pub use clock::{Clock, FixedClock, SystemClock};
pub use entry::Entry;
pub use error::{LoggerError, Result};
pub use error_value::{ErrorValue, Frame, StructuredError};
pub use field::{Field, FieldValue, Fielder, Fields, Sanitizer};
pub use handler::{Handler, HandlerFn};
pub use log_entry::{LogEntry, Origin};
pub use log_level::LogLevel;
pub use logger::{ErrorCallback, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use pool::{BufferPool, EntryPool, FieldPool, Pool, PoolStats, Pools};
pub use timestamp::TimestampFormat;
