use super::error::{ErrorKind, Result, raise};
use super::event::{Action, IngestEvent, Ingested, Observer};
use super::{COMMAND_TARGET, Options};
use crate::classify::{Classification, classify};
use crate::partition::BucketRegistry;
use crate::stats::{RunStatistics, file_type};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use mediapart_extract::MetadataExtractor;
use mediapart_storage::{Transfer, TransferMode};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Everything a worker borrows from the run.
pub(super) struct Worker<'a> {
    pub options: &'a Options,
    pub registry: &'a BucketRegistry,
    pub stats: &'a RunStatistics,
    pub extractor: &'a dyn MetadataExtractor,
    pub transfer: &'a dyn Transfer,
    pub observer: &'a dyn Observer,
}

impl Worker<'_> {
    /// Drain the queue until the producer hangs up.
    pub fn run(&self, id: usize, queue: Receiver<PathBuf>) {
        debug!(worker = id, "worker starting");
        let mut processed: u64 = 0;
        loop {
            match queue.recv_timeout(self.options.queue_poll) {
                Ok(source) => {
                    self.process(&source);
                    processed += 1;
                },
                Err(RecvTimeoutError::Timeout) => {
                    warn!(worker = id, waited = ?self.options.queue_poll, "work queue idle while discovery is running");
                },
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!(worker = id, processed, "worker finished");
    }

    fn process(&self, source: &Path) {
        match self.ingest(source) {
            Ok(ingested) => {
                self.stats.record_success(ingested.bucket, ingested.method, &file_type(source));
                self.observer.on_event(&IngestEvent::Ingested(ingested));
            },
            Err(err) => {
                self.stats.record_failure();
                error!(source = %source.display(), error = ?err, "failed to ingest file");
                let error = (*err).to_string();
                self.observer.on_event(&IngestEvent::Failed { source: source.to_path_buf(), error });
            },
        }
    }

    fn ingest(&self, source: &Path) -> Result<Ingested> {
        let metadata = match self.extractor.extract(source) {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!(source = %source.display(), error = ?err, "no usable metadata");
                None
            },
        };
        let Classification { bucket: id, method } = classify(source, metadata.as_ref());
        let bucket = self.registry.get_or_create(id);
        let destination = bucket.resolve(source).map_err(|err| raise(err, ErrorKind::Naming))?;

        let action = match (self.options.dry_run, self.transfer.mode()) {
            (true, TransferMode::Copy) => Action::WouldCopy,
            (true, TransferMode::Move) => Action::WouldMove,
            (false, mode) => {
                bucket.ensure_dir(self.transfer).map_err(|err| raise(err, ErrorKind::Directory))?;
                self.transfer.transfer(source, &destination).map_err(|err| raise(err, ErrorKind::Transfer))?;
                match mode {
                    TransferMode::Copy => Action::Copied,
                    TransferMode::Move => Action::Moved,
                }
            },
        };
        info!(
            target: COMMAND_TARGET,
            action = %action,
            bucket = %id,
            method = %method,
            source = %source.display(),
            destination = %destination.display()
        );
        Ok(Ingested { source: source.to_path_buf(), destination, bucket: id, method, action })
    }
}
