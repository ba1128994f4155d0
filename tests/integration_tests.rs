//! Integration tests for fieldlog
//!
//! These tests verify:
//! - Level gating against a capturing handler
//! - Field layering order and error attachment
//! - Watch/stop timing brackets
//! - JSON output round trip through a file
//! - Fan-out and asynchronous ownership of entries
//! - Handler failures never reach the caller

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use fieldlog::core::{Pools, TimestampFormat};
use fieldlog::handlers::{JsonHandler, LevelHandler, LogfmtHandler, MemoryHandler, MultiHandler};
use fieldlog::prelude::*;
use fieldlog::{FixedClock, Frame, Origin};
use parking_lot::Mutex;
use std::fmt;
use std::fs;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn capture(level: LogLevel) -> (Arc<MemoryHandler>, Logger) {
    let memory = Arc::new(MemoryHandler::new());
    let logger = Logger::builder()
        .handler(Arc::clone(&memory))
        .min_level(level)
        .pools(Arc::new(Pools::new(64)))
        .build();
    (memory, logger)
}

fn names(entry: &LogEntry) -> Vec<String> {
    entry.fields.iter().map(|f| f.name.clone()).collect()
}

#[derive(Debug)]
struct QuotaError {
    limit: u32,
}

impl fmt::Display for QuotaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quota of {} exceeded", self.limit)
    }
}

impl std::error::Error for QuotaError {}

impl StructuredError for QuotaError {
    fn first_frame(&self) -> Option<Frame> {
        Some(Frame::new("storage::put", "src/storage.rs", 88))
    }

    fn fields(&self) -> Option<Fields> {
        Some(Fields::new().append("limit", self.limit))
    }
}

#[test]
fn test_debug_filtered_info_delivered() {
    let (memory, logger) = capture(LogLevel::Info);

    logger.debug("x");
    logger.info("y");

    let entries = memory.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "y");
    assert_eq!(entries[0].level, LogLevel::Info);
}

#[test]
fn test_layered_fields_flatten_in_order() {
    let (memory, logger) = capture(LogLevel::Info);

    let base = logger.with_field("a", 1);
    base.with_field("b", 2).info("first");
    base.with_fields(&Fields::new().append("c", 3).append("a", 4))
        .info("second");

    let entries = memory.entries();
    assert_eq!(names(&entries[0]), vec!["a", "b"]);
    assert_eq!(names(&entries[1]), vec!["a", "c", "a"]);
    assert_eq!(entries[1].fields.get("a"), Some(&FieldValue::Int(1)));
}

#[test]
fn test_with_error_variants() {
    let (memory, logger) = capture(LogLevel::Info);
    let base = logger.with_field("user", "tobi");

    base.with_error(None::<&QuotaError>).info("no error");
    base.with_error(Some(&QuotaError { limit: 5 })).error("plain");
    base.with_error(Some(ErrorValue::structured(&QuotaError { limit: 5 })))
        .error("structured");

    let entries = memory.entries();
    assert_eq!(names(&entries[0]), vec!["user"]);
    assert_eq!(names(&entries[1]), vec!["user", "error"]);
    assert_eq!(
        entries[1].fields.get("error"),
        Some(&FieldValue::from("quota of 5 exceeded"))
    );
    assert_eq!(names(&entries[2]), vec!["user", "error", "source", "limit"]);
    assert_eq!(
        entries[2].fields.get("source"),
        Some(&FieldValue::from("storage::put: src/storage.rs:88"))
    );
}

#[test]
fn test_with_duration_is_whole_millis() {
    let (memory, logger) = capture(LogLevel::Info);
    logger.with_duration(Duration::from_secs(2)).info("slept");
    logger
        .with_duration(Duration::from_micros(2500))
        .info("short");

    let entries = memory.entries();
    assert_eq!(entries[0].fields.get("duration"), Some(&FieldValue::Int(2000)));
    assert_eq!(entries[1].fields.get("duration"), Some(&FieldValue::Int(2)));
}

#[test]
fn test_kv_arguments() {
    let (memory, logger) = capture(LogLevel::Info);
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");

    logger.info_kv(
        "upload",
        vec![
            "file".into(),
            "sloth.png".into(),
            Arg::error(&err),
            Field::new("size", 1024).into(),
            7.into(),
            true.into(),
            "dangling".into(),
        ],
    );

    let entry = &memory.entries()[0];
    assert_eq!(names(entry), vec!["file", "error", "size", "7", "unknown"]);
    assert_eq!(entry.fields.get("7"), Some(&FieldValue::Bool(true)));
    assert_eq!(entry.fields.get("unknown"), Some(&FieldValue::from("dangling")));
}

#[test]
fn test_single_list_argument_expanded() {
    let (memory, logger) = capture(LogLevel::Info);
    let prepared: Vec<Arg> = vec!["k1".into(), "v1".into()];
    logger.info_kv("spread", [Arg::from(prepared)]);

    assert_eq!(
        memory.entries()[0].fields.get("k1"),
        Some(&FieldValue::from("v1"))
    );
}

#[test]
fn test_watch_stop_success_and_failure() {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(start));
    let memory = Arc::new(MemoryHandler::new());
    let logger = Logger::builder()
        .handler(Arc::clone(&memory))
        .clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .build();

    let ctx = logger.with_field("file", "sloth.png");

    let watch = ctx.watch("upload");
    clock.advance(ChronoDuration::milliseconds(120));
    watch.stop(None::<&std::io::Error>);

    let watch = ctx.watch("upload");
    clock.advance(ChronoDuration::milliseconds(30));
    let err = std::io::Error::new(std::io::ErrorKind::Other, "timeout");
    watch.stop(Some(&err));

    let entries = memory.entries();
    assert_eq!(entries.len(), 4);

    assert_eq!(entries[0].level, LogLevel::Info);
    assert_eq!(names(&entries[0]), vec!["file"]);
    assert_eq!(entries[0].timestamp, start);

    assert_eq!(entries[1].level, LogLevel::Info);
    assert_eq!(entries[1].message, "upload");
    assert_eq!(names(&entries[1]), vec!["file", "duration"]);
    assert_eq!(entries[1].fields.get("duration"), Some(&FieldValue::Int(120)));

    assert_eq!(entries[3].level, LogLevel::Error);
    assert_eq!(names(&entries[3]), vec!["file", "duration", "error"]);
    assert_eq!(entries[3].fields.get("duration"), Some(&FieldValue::Int(30)));
    assert_eq!(entries[3].fields.get("error"), Some(&FieldValue::from("timeout")));
}

#[test]
fn test_stop_duration_never_negative() {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(start));
    let memory = Arc::new(MemoryHandler::new());
    let logger = Logger::builder()
        .handler(Arc::clone(&memory))
        .clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .build();

    let watch = logger.watch("rewind");
    clock.set(start - ChronoDuration::seconds(5));
    watch.stop(None::<&std::io::Error>);

    assert_eq!(memory.entries()[1].fields.get("duration"), Some(&FieldValue::Int(0)));
}

#[test]
fn test_json_file_output_decodes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("entries.jsonl");

    {
        let logger = Logger::new(
            JsonHandler::open(&log_file).expect("Failed to open log file"),
            LogLevel::Info,
        );
        logger.with_field("name", "bob").info("hello");
        logger.with_field("attempt", 2).warn("retrying");
        logger.debug("filtered");
    }

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let decoded: Vec<LogEntry> = content
        .lines()
        .map(|line| LogEntry::from_json(line).expect("valid entry"))
        .collect();

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].message, "hello");
    assert_eq!(decoded[0].fields.get("name"), Some(&FieldValue::from("bob")));
    assert_eq!(decoded[1].level, LogLevel::Warn);
}

#[test]
fn test_serialized_entry_round_trip() {
    let json = r#"{"fields":{"name":"bob"},"level":"info","timestamp":"0001-01-01T00:00:00Z","message":"hello"}"#;
    let entry = LogEntry::from_json(json).expect("valid entry");

    assert_eq!(entry.level, LogLevel::Info);
    assert_eq!(entry.message, "hello");
    assert_eq!(entry.fields.get("name"), Some(&FieldValue::from("bob")));
    assert_eq!(entry.to_json().expect("encode"), json);
}

#[test]
fn test_level_parsing() {
    assert_eq!(LogLevel::parse("WARNING").unwrap(), LogLevel::Warn);
    assert_eq!("Fatal".parse::<LogLevel>().unwrap(), LogLevel::Fatal);

    let err = LogLevel::parse("verbose").unwrap_err();
    assert!(matches!(err, LoggerError::InvalidLevel(ref s) if s == "verbose"));
}

#[test]
fn test_fan_out_with_level_child() {
    let everything = Arc::new(MemoryHandler::new());
    let errors_only = Arc::new(MemoryHandler::new());
    let logger = Logger::new(
        MultiHandler::default()
            .with(Arc::clone(&everything))
            .with(LevelHandler::new(Arc::clone(&errors_only), LogLevel::Error)),
        LogLevel::Info,
    );

    logger.info("hello");
    logger.info("world");
    logger.error("boom");

    assert_eq!(everything.len(), 3);
    assert_eq!(errors_only.len(), 1);
    assert_eq!(errors_only.entries()[0].message, "boom");
}

#[test]
fn test_mixed_fan_out_never_recycles_retained_entries() {
    let retained = Arc::new(MemoryHandler::new());
    let seen_origins = Arc::new(Mutex::new(Vec::new()));
    let origins = Arc::clone(&seen_origins);
    let pools = Arc::new(Pools::new(16));

    let logger = Logger::builder()
        .handler(
            MultiHandler::default()
                .with(HandlerFn::new(move |entry: &LogEntry| {
                    origins.lock().push(entry.origin());
                    Ok(())
                }))
                .with(Arc::clone(&retained)),
        )
        .pools(Arc::clone(&pools))
        .build();

    for i in 0..10 {
        logger.with_field("i", i).info("tick");
    }

    assert!(seen_origins.lock().iter().all(|o| *o == Origin::Retained));
    assert!(pools.entries.is_empty());

    let kept = retained.entries();
    for (i, entry) in kept.iter().enumerate() {
        assert_eq!(entry.message, "tick");
        assert_eq!(entry.fields.get("i"), Some(&FieldValue::Int(i as i64)));
    }
}

#[test]
fn test_sync_handler_entries_recycled_without_stale_data() {
    let pools = Arc::new(Pools::new(16));
    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&snapshots);

    let logger = Logger::builder()
        .handler(HandlerFn::new(move |entry: &LogEntry| {
            sink.lock().push((entry.origin(), names(entry), entry.message.clone()));
            Ok(())
        }))
        .pools(Arc::clone(&pools))
        .build();

    logger.with_field("secret", "x").with_field("other", 1).info("first");
    logger.info("second");

    let snapshots = snapshots.lock();
    assert_eq!(snapshots[0].0, Origin::Pooled);
    assert_eq!(snapshots[0].1, vec!["secret", "other"]);
    assert!(snapshots[1].1.is_empty());
    assert_eq!(snapshots[1].2, "second");
    assert!(pools.entries.stats().hits >= 1);
}

#[test]
fn test_handler_failure_is_swallowed() {
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    let logger = Logger::builder()
        .handler(HandlerFn::new(|_entry: &LogEntry| {
            Err(LoggerError::handler("remote", "connection refused"))
        }))
        .on_handler_error(Arc::new(move |err| sink.lock().push(err.to_string())))
        .build();

    logger.info("one");
    logger.warn("two");

    assert_eq!(
        *failures.lock(),
        vec![
            "Handler 'remote' failed: connection refused".to_string(),
            "Handler 'remote' failed: connection refused".to_string(),
        ]
    );
    assert_eq!(logger.metrics().failed_count(), 2);
}

#[test]
fn test_logfmt_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("entries.logfmt");
    let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();

    {
        let file = fs::File::create(&log_file).expect("Failed to create log file");
        let logger = Logger::builder()
            .handler(LogfmtHandler::new(file).with_timestamp_format(TimestampFormat::Rfc3339))
            .clock(Arc::new(FixedClock::new(at)))
            .build();
        logger.with_field("user", "tj").info("hello world");
    }

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(
        content,
        "timestamp=2025-01-08T10:30:45Z level=info message=\"hello world\" user=tj\n"
    );
}

const FATAL_CHILD_PATH: &str = "FIELDLOG_FATAL_CHILD_PATH";

#[test]
fn test_fatal_flushes_buffered_handler_before_exit() {
    // Re-entered in a child process, which logs and dies.
    if let Ok(path) = std::env::var(FATAL_CHILD_PATH) {
        let handler = JsonHandler::open(&path).expect("Failed to open log file");
        let logger = Logger::new(handler, LogLevel::Info);
        logger.info("before");
        logger.with_field("code", 7).fatal("dying");
    }

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("fatal.jsonl");

    let status = Command::new(std::env::current_exe().expect("test binary path"))
        .args(["--exact", "test_fatal_flushes_buffered_handler_before_exit", "--nocapture"])
        .env(FATAL_CHILD_PATH, &log_file)
        .status()
        .expect("Failed to run child process");
    assert_eq!(status.code(), Some(1));

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let entries: Vec<LogEntry> = content
        .lines()
        .map(|line| LogEntry::from_json(line).expect("valid JSON line"))
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "before");
    assert_eq!(entries[1].level, LogLevel::Fatal);
    assert_eq!(entries[1].message, "dying");
    assert_eq!(entries[1].fields.get("code"), Some(&FieldValue::Int(7)));
}
