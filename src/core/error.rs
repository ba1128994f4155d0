//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Level string did not name a known severity
    #[error("invalid level: '{0}'")]
    InvalidLevel(String),

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization or decoding error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A handler reported a delivery failure
    #[error("Handler '{handler}' failed: {message}")]
    HandlerError { handler: String, message: String },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid level error for the rejected input
    pub fn invalid_level(input: impl Into<String>) -> Self {
        LoggerError::InvalidLevel(input.into())
    }

    /// Create a handler delivery error
    pub fn handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::HandlerError {
            handler: handler.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::invalid_level("loud");
        assert!(matches!(err, LoggerError::InvalidLevel(_)));

        let err = LoggerError::handler("json", "broken pipe");
        assert!(matches!(err, LoggerError::HandlerError { .. }));

        let err = LoggerError::from(std::io::Error::new(std::io::ErrorKind::Other, "closed"));
        assert!(matches!(err, LoggerError::IoError(_)));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::invalid_level("something");
        assert_eq!(err.to_string(), "invalid level: 'something'");

        let err = LoggerError::handler("multi", "child failed");
        assert_eq!(err.to_string(), "Handler 'multi' failed: child failed");

        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(LoggerError::from(err).to_string().starts_with("JSON error: "));
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = LoggerError::io_operation("writing entry", "stdout went away", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing entry"));
        assert!(err.to_string().contains("stdout went away"));
    }
}
