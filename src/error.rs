//! Error types for pstyle.

use thiserror::Error;

use crate::style::Style;
use crate::value::ArgFamily;

/// The main error type for pstyle operations.
#[derive(Debug, Error)]
pub enum PstyleError {
    /// Failed to tokenize the SQL text.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Unknown placeholder style name.
    #[error("Unknown paramstyle: '{0}'. Expected: qmark, numeric, named, format, pyformat or auto")]
    UnknownStyle(String),

    /// No direct rule and no path through the qmark pivot.
    #[error("Conversion not supported: from={from}, to={to}")]
    Unsupported { from: Style, to: Style },

    /// Placeholder addresses a position past the end of the ordered arguments.
    #[error("Placeholder '{placeholder}' wants argument #{position} but only {len} supplied")]
    IndexOutOfRange {
        placeholder: String,
        position: usize,
        len: usize,
    },

    /// Placeholder names a key absent from the mapping arguments.
    #[error("Placeholder '{placeholder}' refers to missing key '{key}'")]
    MissingKey { placeholder: String, key: String },

    /// Placeholder needs the other argument container shape.
    #[error("Placeholder '{placeholder}' needs {expected} arguments")]
    ArgsShape {
        placeholder: String,
        expected: ArgFamily,
    },

    /// Colon-prefixed placeholder that is neither an index nor a resolvable name.
    #[error("Malformed placeholder: '{0}'")]
    MalformedPlaceholder(String),

    /// A batch rewrote to different SQL for different argument sets.
    #[error("Batch rewrote to inconsistent SQL: expected '{expected}', got '{actual}'")]
    BatchInconsistency { expected: String, actual: String },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PstyleError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create an out-of-range error. `position` is 1-origin.
    pub fn out_of_range(placeholder: &str, position: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            placeholder: placeholder.to_string(),
            position,
            len,
        }
    }

    /// Create a missing key error.
    pub fn missing_key(placeholder: &str, key: &str) -> Self {
        Self::MissingKey {
            placeholder: placeholder.to_string(),
            key: key.to_string(),
        }
    }

    /// Create a wrong container shape error.
    pub fn shape(placeholder: &str, expected: ArgFamily) -> Self {
        Self::ArgsShape {
            placeholder: placeholder.to_string(),
            expected,
        }
    }

    /// True for the argument binding family (range, key, shape).
    pub fn is_binding(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::MissingKey { .. } | Self::ArgsShape { .. }
        )
    }
}

/// Result type alias for pstyle operations.
pub type PstyleResult<T> = Result<T, PstyleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PstyleError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }

    #[test]
    fn test_unsupported_display() {
        let err = PstyleError::Unsupported {
            from: Style::Qmark,
            to: Style::Auto,
        };
        assert_eq!(err.to_string(), "Conversion not supported: from=qmark, to=auto");
    }

    #[test]
    fn test_binding_family() {
        assert!(PstyleError::out_of_range(":3", 3, 2).is_binding());
        assert!(PstyleError::missing_key(":id", "id").is_binding());
        assert!(PstyleError::shape("?", ArgFamily::Ordered).is_binding());
        assert!(!PstyleError::MalformedPlaceholder(":x".into()).is_binding());
        assert_eq!(
            PstyleError::shape("?", ArgFamily::Ordered).to_string(),
            "Placeholder '?' needs ordered arguments"
        );
    }
}
