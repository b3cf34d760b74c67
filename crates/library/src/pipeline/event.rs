use crate::classify::{BucketId, Method};
use derive_more::Display;
use std::path::PathBuf;

/// What happened to a file.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Action {
    #[display("copied")]
    Copied,
    #[display("moved")]
    Moved,
    /// Dry run: the file would have been copied.
    #[display("would-copy")]
    WouldCopy,
    /// Dry run: the file would have been moved.
    #[display("would-move")]
    WouldMove,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ingested {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bucket: BucketId,
    pub method: Method,
    pub action: Action,
}

/// Progress events emitted during [`Partitioner::run`](crate::Partitioner::run).
///
/// [`Discovered`](Self::Discovered) comes first, exactly once. Then one of [`Ingested`](Self::Ingested) or
/// [`Failed`](Self::Failed) per work item, from whichever worker handled it, in no particular order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestEvent {
    /// Result of the counting pass over the source tree.
    Discovered(u64),
    Ingested(Ingested),
    Failed { source: PathBuf, error: String },
}

/// Receives [`IngestEvent`]s from every worker thread.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &IngestEvent);
}

/// Ignore all events.
impl Observer for () {
    fn on_event(&self, _event: &IngestEvent) {}
}
