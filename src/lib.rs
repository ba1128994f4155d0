//! # fieldlog
//!
//! Structured logging built from layered fields.
//!
//! ## Features
//!
//! - **Layered fields**: `with_field` chains share field batches instead of
//!   copying them
//! - **Level gating**: one threshold per logger, checked before any work
//! - **Pooled hot path**: finalized entries, fields and encoder buffers are
//!   recycled through thread-safe pools
//! - **Pluggable handlers**: memory, JSON, logfmt, colored text, fan-out
//!
//! ```
//! use fieldlog::prelude::*;
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemoryHandler::new());
//! let logger = Logger::new(Arc::clone(&memory), LogLevel::Info);
//!
//! logger
//!     .with_field("file", "sloth.png")
//!     .with_field("user", "tobi")
//!     .info("upload");
//!
//! assert_eq!(memory.entries()[0].fields.names(), vec!["file", "user"]);
//! ```

pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::handlers::TextHandler;
    pub use crate::handlers::{
        DiscardHandler, JsonHandler, LevelHandler, LogfmtHandler, MemoryHandler, MultiHandler,
    };
    pub use crate::core::{
        Arg, Clock, Entry, ErrorValue, Field, FieldValue, Fielder, Fields, Handler, HandlerFn,
        LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics, Result,
        StructuredError,
    };
    pub use crate::kv;
}

pub use crate::core::{
    Arg, Clock, Entry, ErrorCallback, ErrorValue, Field, FieldValue, Fielder, Fields, FixedClock,
    Frame, Handler, HandlerFn, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError,
    LoggerMetrics, Origin, Pools, Result, Sanitizer, StructuredError, SystemClock,
    TimestampFormat,
};
