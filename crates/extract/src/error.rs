//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Callers partitioning a library treat every variant as "no metadata".
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file could not be opened for reading.
    #[display("unable to open file: {}", _0.display())]
    Open(#[error(not(source))] PathBuf),
    /// The container is corrupt, truncated, or of a format the reader does
    /// not understand.
    #[display("unreadable metadata container: {_0}")]
    Container(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A file that is locked or on a flaky mount might open next time; a
        // broken container never will.
        matches!(self, Self::Open(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Open(PathBuf::from("/a/b.jpg")).to_string(), "unable to open file: /a/b.jpg");
        assert_eq!(
            ErrorKind::Container("truncated".to_string()).to_string(),
            "unreadable metadata container: truncated"
        );
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Open(PathBuf::from("x")).is_retryable());
        assert!(!ErrorKind::Container(String::new()).is_retryable());
    }
}
