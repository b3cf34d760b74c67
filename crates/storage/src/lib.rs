//! Filesystem primitives for mediapart: finding candidate files and moving them into place.

pub mod discovery;
pub mod error;
mod path;
pub mod transfer;

pub use crate::discovery::{Discovery, Filter, LocalDiscovery};
pub use crate::path::relative_to;
pub use crate::transfer::{LocalTransfer, Transfer, TransferMode};
#[cfg(any(test, feature = "mock"))]
pub use crate::transfer::{MockTransfer, TransferCall};
