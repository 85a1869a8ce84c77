//! Error types for EXIF operations
//!
//! This module defines all error types used throughout the crate, plus the
//! non-fatal warning record that lenient parsing accumulates.

use thiserror::Error;

/// Error types for EXIF parsing and serialization
#[derive(Debug, Error)]
pub enum ExifError {
    /// The input file could not be opened or mapped
    #[error("cannot open file: {0}")]
    CannotOpenFile(String),

    /// No registered container handler recognizes the input
    #[error("unknown file type: {0}")]
    UnknownFileType(String),

    /// The input is structurally damaged (out-of-range offset, bad magic, ...)
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// An expected tag or segment is missing
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// Internal invariant violated (e.g. string arena exhausted)
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Result type alias for EXIF operations
pub type ExifResult<T> = Result<T, ExifError>;

/// A recoverable anomaly encountered during lenient parsing.
///
/// Warnings are ordered by encounter time and never affect fields that
/// decoded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Short description of the anomaly
    pub message: String,
    /// Optional context (tag name, directory, ...)
    pub what: Option<String>,
}

impl ParseWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            what: None,
        }
    }

    pub fn with_what(message: impl Into<String>, what: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            what: Some(what.into()),
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.what {
            Some(what) => write!(f, "{} ({})", self.message, what),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExifError::CorruptData("seek out of bounds".to_string());
        assert!(err.to_string().contains("corrupt data: seek out of bounds"));
    }

    #[test]
    fn test_warning_display() {
        let warn = ParseWarning::with_what("dtype did not match, but fits", "Make");
        assert_eq!(warn.to_string(), "dtype did not match, but fits (Make)");

        let warn = ParseWarning::new("directory chain too long");
        assert_eq!(warn.to_string(), "directory chain too long");
    }
}
