//! Errors as field values
//!
//! An error handed to the logger is resolved once, at the point it is
//! attached, into an [`ErrorValue`]: its message plus whichever optional
//! capabilities the error exposes through [`StructuredError`].

use super::field::{FieldValue, Fields};
use std::fmt;
use std::panic::Location;

/// Source location of the first frame an error was raised from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl Frame {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Frame of the caller, with `function` naming the enclosing module path.
    #[track_caller]
    pub fn caller(function: impl Into<String>) -> Self {
        let location = Location::caller();
        Self::new(function, location.file(), location.line())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}:{}", self.function, self.file, self.line)
    }
}

/// Optional capabilities an error type can expose to the logger.
///
/// Every method defaults to `None`, so `impl StructuredError for MyError {}`
/// is enough to pass an error through the structured path.
///
/// # Example
///
/// ```
/// use fieldlog::{Fields, StructuredError};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct Timeout;
///
/// impl fmt::Display for Timeout {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "boom")
///     }
/// }
///
/// impl std::error::Error for Timeout {}
///
/// impl StructuredError for Timeout {
///     fn fields(&self) -> Option<Fields> {
///         Some(Fields::new().append("reason", "timeout"))
///     }
/// }
/// ```
pub trait StructuredError: std::error::Error {
    /// First stack frame, rendered as a "source" field.
    fn first_frame(&self) -> Option<Frame> {
        None
    }

    /// Extra context appended after the "error" field.
    fn fields(&self) -> Option<Fields> {
        None
    }

    /// Custom serialized form used instead of the message when the error
    /// appears as a plain value.
    fn serialized(&self) -> Option<serde_json::Value> {
        None
    }
}

/// An error resolved into loggable parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    message: String,
    frame: Option<Frame>,
    fields: Option<Fields>,
    serialized: Option<serde_json::Value>,
}

impl ErrorValue {
    /// Resolve a plain error: only its message is captured.
    pub fn new<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::from_message(err.to_string())
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frame: None,
            fields: None,
            serialized: None,
        }
    }

    /// Resolve an error together with every capability it exposes.
    pub fn structured<E: StructuredError + ?Sized>(err: &E) -> Self {
        Self {
            message: err.to_string(),
            frame: err.first_frame(),
            fields: err.fields(),
            serialized: err.serialized(),
        }
    }

    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = Some(fields);
        self
    }

    #[must_use]
    pub fn with_serialized(mut self, value: serde_json::Value) -> Self {
        self.serialized = Some(value);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn fields(&self) -> Option<&Fields> {
        self.fields.as_ref()
    }

    /// Value recorded when the error is used as a plain field value: its own
    /// serialization when it has one, its message otherwise.
    pub fn to_field_value(&self) -> FieldValue {
        match &self.serialized {
            Some(v) => v.clone().into(),
            None => FieldValue::String(self.message.clone()),
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E: std::error::Error + ?Sized> From<&E> for ErrorValue {
    fn from(err: &E) -> Self {
        ErrorValue::new(err)
    }
}

impl From<&ErrorValue> for ErrorValue {
    fn from(err: &ErrorValue) -> Self {
        err.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Descriptor {
        errno: i32,
        reason: &'static str,
    }

    impl fmt::Display for Descriptor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}/{}", self.errno, self.reason)
        }
    }

    impl std::error::Error for Descriptor {}

    impl StructuredError for Descriptor {
        fn serialized(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({"errno": self.errno, "reason": self.reason}))
        }
    }

    #[test]
    fn test_plain_error_uses_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "comparison failed");
        let value = ErrorValue::new(&io);
        assert_eq!(value.message(), "comparison failed");
        assert_eq!(value.to_field_value(), FieldValue::from("comparison failed"));
        assert!(value.frame().is_none());
    }

    #[test]
    fn test_structured_error_keeps_serialization() {
        let err = Descriptor { errno: 26, reason: "bad descriptor" };

        let plain = ErrorValue::new(&err);
        assert_eq!(plain.to_field_value(), FieldValue::from("26/bad descriptor"));

        let structured = ErrorValue::structured(&err);
        assert_eq!(
            structured.to_field_value().to_json_value(),
            serde_json::json!({"errno": 26, "reason": "bad descriptor"})
        );
    }

    #[test]
    fn test_frame_display() {
        let frame = Frame::new("main.upload", "/src/upload.rs", 42);
        assert_eq!(frame.to_string(), "main.upload: /src/upload.rs:42");
    }

    #[test]
    fn test_frame_caller_captures_location() {
        let frame = Frame::caller(module_path!());
        assert!(frame.file.ends_with("error_value.rs"));
        assert!(frame.line > 0);
    }
}
