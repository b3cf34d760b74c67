//! Destination placement.
//!
//! Each [`BucketId`](crate::BucketId) maps to exactly one [`Bucket`], owned by the run's [`BucketRegistry`]. A
//! bucket names files with its own [`DestinationNamer`] and creates its directory at most once. Buckets never share
//! locks, so workers placing files into different years never wait on each other.

mod bucket;
pub mod error;
mod namer;
mod registry;
mod seen;

pub use self::bucket::Bucket;
pub use self::namer::{DestinationNamer, Layout, Naming};
pub use self::registry::BucketRegistry;
pub use self::seen::SeenNames;
