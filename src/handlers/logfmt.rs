//! Logfmt handler (key=value pairs)
//!
//! Example line:
//! `timestamp=2025-01-08T10:30:45Z level=info message="Request processed" user=tj`

use crate::core::{FieldValue, Handler, LogEntry, LoggerError, Pools, Result, TimestampFormat};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

pub struct LogfmtHandler<W: Write + Send> {
    writer: Mutex<W>,
    timestamp_format: TimestampFormat,
    pools: Arc<Pools>,
}

impl<W: Write + Send> LogfmtHandler<W> {
    pub fn new(writer: W) -> Self {
        Self::with_pools(writer, Pools::global())
    }

    pub fn with_pools(writer: W, pools: Arc<Pools>) -> Self {
        Self {
            writer: Mutex::new(writer),
            timestamp_format: TimestampFormat::default(),
            pools,
        }
    }

    /// Set the timestamp format for this handler
    ///
    /// ```
    /// use fieldlog::core::TimestampFormat;
    /// use fieldlog::handlers::LogfmtHandler;
    ///
    /// let handler = LogfmtHandler::new(std::io::stderr())
    ///     .with_timestamp_format(TimestampFormat::UnixMillis);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn encode(&self, buf: &mut Vec<u8>, entry: &LogEntry) -> std::io::Result<()> {
        write!(buf, "timestamp=")?;
        let timestamp = self.timestamp_format.format(&entry.timestamp);
        if self.timestamp_format.is_numeric() {
            buf.extend_from_slice(timestamp.as_bytes());
        } else {
            write_value(buf, &timestamp)?;
        }
        write!(buf, " level={} message=", entry.level.name())?;
        write_value(buf, &entry.message)?;

        for field in &entry.fields {
            buf.push(b' ');
            write_key(buf, &field.name);
            buf.push(b'=');
            match &field.value {
                FieldValue::String(s) => write_value(buf, s)?,
                FieldValue::Null => buf.extend_from_slice(b"null"),
                other => write_value(buf, &other.to_string())?,
            }
        }
        buf.push(b'\n');
        Ok(())
    }
}

/// Keys keep only characters that never need quoting.
fn write_key(buf: &mut Vec<u8>, key: &str) {
    let start = buf.len();
    for c in key.chars() {
        if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/') {
            let mut utf8 = [0u8; 4];
            buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        }
    }
    if buf.len() == start {
        buf.push(b'_');
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c <= ' ' || c == '=' || c == '"' || c == '\\' || c.is_control())
}

fn write_value(buf: &mut Vec<u8>, value: &str) -> std::io::Result<()> {
    if !needs_quoting(value) {
        buf.extend_from_slice(value.as_bytes());
        return Ok(());
    }
    buf.push(b'"');
    for c in value.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if c.is_control() => write!(buf, "\\u{:04x}", c as u32)?,
            c => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    buf.push(b'"');
    Ok(())
}

impl<W: Write + Send> Handler for LogfmtHandler<W> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fields, LogLevel};
    use chrono::{TimeZone, Utc};

    fn render(handler: LogfmtHandler<Vec<u8>>, entry: LogEntry) -> String {
        handler.handle(&Arc::new(entry)).unwrap();
        String::from_utf8(handler.into_inner()).unwrap()
    }

    fn at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap()
    }

    #[test]
    fn test_logfmt_line() {
        let entry = LogEntry::new(LogLevel::Info, "hello")
            .with_fields(Fields::new().append("user", "tj").append("id", 123))
            .with_timestamp(at());
        let handler = LogfmtHandler::with_pools(Vec::new(), Arc::new(Pools::new(2)));

        assert_eq!(
            render(handler, entry),
            "timestamp=2025-01-08T10:30:45Z level=info message=hello user=tj id=123\n"
        );
    }

    #[test]
    fn test_logfmt_quotes_values() {
        let entry = LogEntry::new(LogLevel::Warn, "Warning message")
            .with_fields(
                Fields::new()
                    .append("query", "SELECT * FROM users WHERE id=1")
                    .append("empty", "")
                    .append("quote", "say \"hi\"")
                    .append("missing", FieldValue::Null),
            )
            .with_timestamp(at());
        let out = render(
            LogfmtHandler::with_pools(Vec::new(), Arc::new(Pools::new(2))),
            entry,
        );

        assert!(out.contains("message=\"Warning message\""));
        assert!(out.contains("query=\"SELECT * FROM users WHERE id=1\""));
        assert!(out.contains("empty=\"\""));
        assert!(out.contains("quote=\"say \\\"hi\\\"\""));
        assert!(out.contains("missing=null"));
    }

    #[test]
    fn test_logfmt_key_sanitized() {
        let entry = LogEntry::new(LogLevel::Debug, "x")
            .with_fields(Fields::new().append("user id", 7).append("==", 1))
            .with_timestamp(at());
        let out = render(
            LogfmtHandler::with_pools(Vec::new(), Arc::new(Pools::new(2))),
            entry,
        );
        assert!(out.contains(" userid=7"));
        assert!(out.contains(" _=1"));
    }

    #[test]
    fn test_logfmt_numeric_timestamp() {
        let entry = LogEntry::new(LogLevel::Error, "boom").with_timestamp(at());
        let handler = LogfmtHandler::with_pools(Vec::new(), Arc::new(Pools::new(2)))
            .with_timestamp_format(TimestampFormat::Unix);
        assert_eq!(
            render(handler, entry),
            "timestamp=1736332245 level=error message=boom\n"
        );
    }
}
