//! Error types for ingesting a single file.
//!
//! None of these stop a run: the file is counted as failed and the workers move on.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No destination path could be reserved.
    #[display("naming failed: {_0}")]
    Naming(#[error(not(source))] String),
    #[display("bucket directory failed: {_0}")]
    Directory(#[error(not(source))] String),
    #[display("transfer failed: {_0}")]
    Transfer(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Directory(_) | Self::Transfer(_))
    }
}

/// Wrap `err` in the ingest step that failed, carrying its message along for reporting.
pub(crate) fn raise<E>(err: exn::Exn<E>, kind: fn(String) -> ErrorKind) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let reason = (*err).to_string();
    err.raise(kind(reason))
}
