//! Human-readable text handler for development

use crate::core::{Handler, LogEntry, LoggerError, Pools, Result};
use colored::Colorize;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

/// Writes `LEVEL[secs] message  key=value ...` lines.
///
/// `secs` counts whole seconds since the handler was created. Level and
/// field names are colored by severity unless colors are turned off.
pub struct TextHandler<W: Write + Send> {
    writer: Mutex<W>,
    use_colors: bool,
    start: Instant,
    pools: Arc<Pools>,
}

impl<W: Write + Send> TextHandler<W> {
    pub fn new(writer: W) -> Self {
        Self::with_pools(writer, Pools::global())
    }

    /// Use `pools` for line buffers instead of the process-wide ones.
    pub fn with_pools(writer: W, pools: Arc<Pools>) -> Self {
        Self {
            writer: Mutex::new(writer),
            use_colors: true,
            start: Instant::now(),
            pools,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn encode(&self, buf: &mut Vec<u8>, entry: &LogEntry) -> std::io::Result<()> {
        let level = entry.level.to_str();
        let elapsed = self.start.elapsed().as_secs();

        if self.use_colors {
            let color = entry.level.color_code();
            buf.resize(buf.len() + 6usize.saturating_sub(level.len()), b' ');
            write!(buf, "{}", level.color(color))?;
            write!(buf, "[{:04}] {:<25}", elapsed, entry.message)?;
            for field in &entry.fields {
                write!(buf, " {}={}", field.name.as_str().color(color), field.value)?;
            }
        } else {
            write!(buf, "{:>6}[{:04}] {:<25}", level, elapsed, entry.message)?;
            for field in &entry.fields {
                write!(buf, " {}={}", field.name, field.value)?;
            }
        }
        buf.push(b'\n');
        Ok(())
    }
}

impl TextHandler<std::io::Stderr> {
    /// Text handler writing to stderr.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> Handler for TextHandler<W> {
    fn handle(&self, entry: &Arc<LogEntry>) -> Result<()> {
        let mut buf = self.pools.buffers.acquire();
        let result = self
            .encode(&mut buf, entry)
            .and_then(|()| self.writer.lock().write_all(&buf))
            .map_err(|e| LoggerError::io_operation("writing entry", e.to_string(), e));
        self.pools.buffers.release(buf);
        result
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LoggerError::io_operation("flushing entries", e.to_string(), e))
    }
}
