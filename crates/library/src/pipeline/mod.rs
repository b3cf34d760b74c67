//! The concurrent partitioning pipeline.
//!
//! One producer feeds discovered paths into a bounded queue; a fixed pool of worker threads drains it. For every
//! path a worker extracts metadata, classifies the file into a year bucket, reserves a destination name in that
//! bucket and (unless this is a dry run) transfers the file. When the producer is done it closes the queue, the
//! workers exit once it is empty, and the statistics are read after every worker has been joined.

pub mod error;
mod event;
mod worker;

pub use self::event::{Action, IngestEvent, Ingested, Observer};
use self::worker::Worker;
use crate::error::{ErrorKind, Result};
use crate::partition::{BucketRegistry, Layout, Naming};
use crate::stats::{RunReport, RunStatistics};
use exn::ResultExt;
use mediapart_extract::{FirstMatch, MetadataExtractor};
use mediapart_storage::{Discovery, LocalTransfer, Transfer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, instrument};

/// Tracing target for one record per planned or executed transfer.
pub const COMMAND_TARGET: &str = "mediapart::commands";

#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub layout: Layout,
    /// Classify and name files, but never touch the destination.
    pub dry_run: bool,
    pub workers: usize,
    pub queue_capacity: usize,
    /// How long an idle worker waits before logging that the queue is starved.
    pub queue_poll: Duration,
    /// Expected number of files per bucket; sizes the flatten-mode name filter.
    pub bucket_capacity: usize,
    pub false_positive_rate: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            dry_run: true,
            workers: 10,
            queue_capacity: 10_000,
            queue_poll: Duration::from_secs(30),
            bucket_capacity: 50_000,
            false_positive_rate: 0.001,
        }
    }
}

/// Coordinates a single partitioning run.
pub struct Partitioner {
    source_root: PathBuf,
    destination: PathBuf,
    options: Options,
    extractor: Arc<dyn MetadataExtractor>,
    transfer: Arc<dyn Transfer>,
}

impl Partitioner {
    /// Reads EXIF and video container metadata and copies files with [`LocalTransfer`] unless told otherwise.
    pub fn new(source_root: impl Into<PathBuf>, destination: impl Into<PathBuf>, options: Options) -> Self {
        Self {
            source_root: source_root.into(),
            destination: destination.into(),
            options,
            extractor: Arc::new(FirstMatch::media()),
            transfer: Arc::new(LocalTransfer::default()),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn MetadataExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_transfer(mut self, transfer: Arc<dyn Transfer>) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Partition everything `discovery` yields.
    ///
    /// Individual file failures are counted in the report; only failing to start the worker pool is an error.
    #[instrument(level = "debug", skip_all, fields(source = %self.source_root.display(), dry_run = self.options.dry_run))]
    pub fn run(&self, discovery: &dyn Discovery, observer: &dyn Observer) -> Result<RunReport> {
        let total = discovery.discover().count() as u64;
        observer.on_event(&IngestEvent::Discovered(total));
        info!(total, workers = self.options.workers, layout = ?self.options.layout, "starting partition run");

        let stats = RunStatistics::new();
        let registry = BucketRegistry::new(
            &self.destination,
            Naming {
                layout: self.options.layout,
                source_root: self.source_root.clone(),
                bucket_capacity: self.options.bucket_capacity,
                false_positive_rate: self.options.false_positive_rate,
            },
        );
        let worker = Worker {
            options: &self.options,
            registry: &registry,
            stats: &stats,
            extractor: self.extractor.as_ref(),
            transfer: self.transfer.as_ref(),
            observer,
        };

        let (sender, receiver) = crossbeam_channel::bounded::<PathBuf>(self.options.queue_capacity.max(1));
        thread::scope(|scope| -> Result<()> {
            // Owned here so an early return hangs up on any workers already started.
            let sender = sender;
            for id in 0..self.options.workers.max(1) {
                let queue = receiver.clone();
                let worker = &worker;
                thread::Builder::new()
                    .name(format!("mediapart-worker-{id}"))
                    .spawn_scoped(scope, move || worker.run(id, queue))
                    .or_raise(|| ErrorKind::Pool)?;
            }
            drop(receiver);
            for path in discovery.discover() {
                stats.record_discovered(1);
                // Only fails once every worker has gone away.
                if sender.send(path).is_err() {
                    break;
                }
            }
            Ok(())
        })?;

        let report = stats.snapshot(self.options.dry_run);
        info!(
            discovered = report.discovered,
            succeeded = report.succeeded,
            failed = report.failed,
            buckets = registry.len(),
            "partition run complete"
        );
        Ok(report)
    }
}
