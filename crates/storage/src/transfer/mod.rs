//! Physical file transfer.
//!
//! The [`Transfer`] trait is the only place the partitioner touches the destination filesystem, so dry runs and
//! tests can swap it out wholesale.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::local::LocalTransfer;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{MockTransfer, TransferCall};
use crate::error::Result;
use derive_more::Display;
use std::path::Path;

/// Whether the source file survives the transfer.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransferMode {
    #[default]
    #[display("copy")]
    Copy,
    #[display("move")]
    Move,
}

pub trait Transfer: Send + Sync {
    fn mode(&self) -> TransferMode;

    /// Create `dir` and any missing parents. Succeeds if the directory already exists.
    fn create_dir_all(&self, dir: &Path) -> Result<()>;

    /// Copy or move `from` to `to`.
    ///
    /// Implementations must refuse to replace an existing `to` with
    /// [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) unless configured to overwrite.
    fn transfer(&self, from: &Path, to: &Path) -> Result<()>;
}
