//! Error types for reader operations.
//!
//! Every fallible call in the workspace returns [`ReaderError`]. The variants
//! separate a missing or lost reader ([`ReaderError::Connection`]) from a
//! hardware call that failed on a live reader ([`ReaderError::Device`]) and
//! from a reader that answered with something we cannot interpret
//! ([`ReaderError::Protocol`]).

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors that can occur while driving the reader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReaderError {
    /// No reader found, or the reader went away.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// A configure/select/deselect/led call failed at the hardware layer.
    #[error("Device error during {operation}: {message}")]
    Device {
        operation: &'static str,
        message: String,
    },

    /// The reader returned a LED status byte outside the defined 0-3 range.
    #[error("Protocol error: undefined LED status byte 0x{status:02X}")]
    Protocol { status: u8 },

    /// A LED intent that cannot be expressed as a raw command.
    #[error("Invalid LED intent: {message}")]
    InvalidIntent { message: String },

    /// Reader configuration rejected.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A background task running a blocking reader call failed to complete.
    #[error("Task error: {message}")]
    Task { message: String },
}

impl ReaderError {
    /// Create a new connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new device error for the named operation.
    pub fn device(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Device {
            operation,
            message: message.into(),
        }
    }

    /// Create a new protocol error for an undefined status byte.
    pub fn protocol(status: u8) -> Self {
        Self::Protocol { status }
    }

    /// Create a new invalid intent error.
    pub fn invalid_intent(message: impl Into<String>) -> Self {
        Self::InvalidIntent {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new task error.
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    /// True when the error means the reader connection is unusable.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error() {
        let error = ReaderError::connection("no reader found");
        assert!(error.is_connection_lost());
        assert_eq!(error.to_string(), "Connection error: no reader found");
    }

    #[test]
    fn test_device_error() {
        let error = ReaderError::device("select", "RF transmission error");
        assert!(matches!(
            error,
            ReaderError::Device {
                operation: "select",
                ..
            }
        ));
        assert!(!error.is_connection_lost());
        assert_eq!(
            error.to_string(),
            "Device error during select: RF transmission error"
        );
    }

    #[test]
    fn test_protocol_error() {
        let error = ReaderError::protocol(0x2A);
        assert_eq!(error, ReaderError::Protocol { status: 42 });
        assert_eq!(
            error.to_string(),
            "Protocol error: undefined LED status byte 0x2A"
        );
    }

    #[test]
    fn test_invalid_intent_error() {
        let error = ReaderError::invalid_intent("negative duration");
        assert_eq!(error.to_string(), "Invalid LED intent: negative duration");
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            ReaderError::config("bad connstring"),
            ReaderError::task("cancelled"),
            ReaderError::device("led", "timeout"),
        ];

        for error in errors {
            let _ = format!("{}", error);
            let _ = format!("{:?}", error);
        }
    }
}
