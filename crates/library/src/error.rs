//! Library Error Types
//!
//! Only structural failures surface here. Problems with individual files are counted and reported through
//! [`IngestEvent::Failed`](crate::IngestEvent::Failed) without stopping the run.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A worker thread could not be started.
    #[display("unable to start worker pool")]
    Pool,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Pool)
    }
}
