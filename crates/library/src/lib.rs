//! The mediapart partitioning engine.
//!
//! Sorts a tree of media files into one directory per year. See [`Partitioner`] for the entry point,
//! [`classify`](crate::classify::classify) for how a year is chosen and [`partition`] for how destination names are
//! kept unique.

pub mod classify;
pub mod error;
pub mod partition;
pub mod pipeline;
pub mod stats;

pub use crate::classify::{BucketId, Classification, Method};
pub use crate::partition::Layout;
pub use crate::pipeline::{Action, COMMAND_TARGET, IngestEvent, Ingested, Observer, Options, Partitioner};
pub use crate::stats::{RunReport, RunStatistics};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, carrying on if a worker panicked while holding it. Every guarded update is a single step, so the
/// data is never left half-written.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
