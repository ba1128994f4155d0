//! Timing work and logging errors
//!
//! Demonstrates `watch`/`stop`, `with_error` with structured errors and the
//! handler failure callback.
//!
//! Run with: cargo run --example watch_and_errors

use fieldlog::prelude::*;
use fieldlog::Frame;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct QuotaExceeded {
    user: String,
    limit: u64,
}

impl fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quota exceeded for {}", self.user)
    }
}

impl std::error::Error for QuotaExceeded {}

impl StructuredError for QuotaExceeded {
    fn first_frame(&self) -> Option<Frame> {
        Some(Frame::new("upload", file!(), line!()))
    }

    fn fields(&self) -> Option<Fields> {
        Some(
            Fields::new()
                .append("user", self.user.as_str())
                .append("limit", self.limit),
        )
    }
}

fn upload(size: u64) -> std::result::Result<(), QuotaExceeded> {
    thread::sleep(Duration::from_millis(25));
    if size > 1024 {
        return Err(QuotaExceeded {
            user: "tobi".to_string(),
            limit: 1024,
        });
    }
    Ok(())
}

fn main() -> Result<()> {
    println!("=== fieldlog - Watch and Errors Example ===\n");

    let logger = Logger::new(JsonHandler::new(std::io::stdout()), LogLevel::Info);

    println!("1. Timing successful work:");
    let watch = logger.with_field("file", "sloth.png").watch("upload");
    watch.finish(&upload(512));

    println!("\n2. Timing failing work:");
    let watch = logger.with_field("file", "huge.png").watch("upload");
    watch.finish(&upload(4096));

    println!("\n3. Structured errors:");
    if let Err(err) = upload(2048) {
        logger
            .with_error(Some(ErrorValue::structured(&err)))
            .error("upload rejected");
    }
    logger.with_error(None::<&std::io::Error>).info("no error attached");

    println!("\n4. Handler failures reach the callback:");
    let failing = HandlerFn::new(|_: &LogEntry| Err(LoggerError::handler("demo", "sink offline")));
    let logger = Logger::builder()
        .handler(failing)
        .on_handler_error(Arc::new(|err: &LoggerError| {
            println!("   callback saw: {}", err);
        }))
        .build();
    logger.info("lost");
    println!(
        "   emitted={} failed={}",
        logger.metrics().emitted_count(),
        logger.metrics().failed_count()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
