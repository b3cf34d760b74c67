//! Error types for the [`partition`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Structured layouts can only place files found below the source root.
    #[display("{} lies outside the source root", _0.display())]
    OutsideRoot(#[error(not(source))] PathBuf),
    #[display("{} has no file name", _0.display())]
    NoFileName(#[error(not(source))] PathBuf),
    /// Every suffix probed was reported as taken; the bucket is far past its capacity.
    #[display("no free destination name for {} after {attempts} attempts", name.display())]
    Exhausted { name: PathBuf, attempts: u32 },
    #[display("unable to create bucket directory {}", _0.display())]
    Directory(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}
