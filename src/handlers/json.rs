//! JSON handler for structured logging

use crate::core::{Handler, LogEntry, LoggerError, Pools, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Writes each entry as a single-line JSON object (JSONL format).
///
/// Lines have the shape `{"fields":{..},"level":"info","timestamp":"..",
/// "message":".."}` and decode back with [`LogEntry::from_json`]. Each
/// line is encoded into a pooled buffer and written with one call while
/// the writer lock is held, so concurrent loggers never interleave lines.
pub struct JsonHandler<W: Write + Send> {
    writer: Mutex<W>,
    pools: Arc<Pools>,
}

impl<W: Write + Send> JsonHandler<W> {
    pub fn new(writer: W) -> Self {
        Self::with_pools(writer, Pools::global())
    }

    /// Use `pools` for encoding buffers instead of the process-wide ones.
    pub fn with_pools(writer: W, pools: Arc<Pools>) -> Self {
        Self {
            writer: Mutex::new(writer),
            pools,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonHandler<BufWriter<File>> {
    /// Append to the file at `path`, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    format!("opening {}", path.display()),
                    e.to_string(),
                    e,
                )
            })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> Handler for JsonHandler<W> {
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()> {
        let mut buf = self.pools.buffers.acquire();
        let encoded = serde_json::to_writer(&mut buf, entry.as_ref());

        let written = match encoded {
            Ok(()) => {
                buf.push(b'\n');
                self.writer
                    .lock()
                    .write_all(&buf)
                    .map_err(|e| LoggerError::io_operation("writing entry", e.to_string(), e))
            }
            Err(e) => Err(LoggerError::from(e)),
        };

        self.pools.buffers.release(buf);
        written
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LoggerError::io_operation("flushing entries", e.to_string(), e))
    }
}
