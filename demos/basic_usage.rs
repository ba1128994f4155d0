//! Basic logger usage example
//!
//! Demonstrates level gating, layered fields and key/value arguments with
//! the text handler.
//!
//! Run with: cargo run --example basic_usage

use fieldlog::prelude::*;
use fieldlog::{info, warn};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== fieldlog - Basic Usage Example ===\n");

    let mut logger = Logger::new(TextHandler::stderr(), LogLevel::Trace);

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");

    println!("\n2. Raising the threshold to INFO:");
    logger.set_min_level("info".parse()?);
    logger.debug("Debug message (hidden)");
    logger.info("Info message (visible)");

    println!("\n3. Layered fields:");
    let request = logger
        .with_field("method", "GET")
        .with_field("path", "/upload");
    request.info("request started");
    request.with_field("status", 200).info("request finished");

    println!("\n4. Key/value arguments and formatting macros:");
    logger.info_kv("upload", kv!["file", "sloth.png", "size", 1024]);
    info!(request, "served {} bytes", 1024);
    warn!(logger, "disk usage at {}%", 91);

    println!("\n5. JSON output to stdout:");
    let json = Logger::new(JsonHandler::new(std::io::stdout()), LogLevel::Info);
    json.with_fields(&Fields::new().append("user", "tobi").append("admin", false))
        .info("login");

    println!("\n6. Fan-out with a per-handler threshold:");
    let memory = Arc::new(MemoryHandler::new());
    let fanout = Logger::new(
        MultiHandler::default()
            .with(LevelHandler::new(TextHandler::stderr(), LogLevel::Warn))
            .with(Arc::clone(&memory)),
        LogLevel::Info,
    );
    fanout.info("kept in memory only");
    fanout.error("printed and kept");
    println!("   memory handler holds {} entries", memory.len());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
