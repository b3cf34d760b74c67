use super::error::{ErrorKind, Result};
use super::namer::{DestinationNamer, Naming};
use crate::classify::BucketId;
use crate::lock;
use exn::ResultExt;
use mediapart_storage::Transfer;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// One year's slice of the destination tree.
#[derive(Debug)]
pub struct Bucket {
    id: BucketId,
    root: PathBuf,
    namer: Mutex<DestinationNamer>,
    /// Whether `root` has been created on disk.
    dir_created: Mutex<bool>,
}

impl Bucket {
    pub fn new(id: BucketId, destination: &Path, naming: &Naming) -> Self {
        let root = destination.join(id.to_string());
        let namer = Mutex::new(DestinationNamer::new(naming, &root));
        Self { id, root, namer, dir_created: Mutex::new(false) }
    }

    pub fn id(&self) -> BucketId {
        self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a destination path for `source`.
    pub fn resolve(&self, source: &Path) -> Result<PathBuf> {
        lock(&self.namer).resolve(source)
    }

    /// Create the bucket directory unless a previous call already did.
    ///
    /// Concurrent callers wait for the first to finish. A failed attempt leaves the bucket uncreated, so the next
    /// file tries again.
    pub fn ensure_dir(&self, transfer: &dyn Transfer) -> Result<()> {
        let mut created = lock(&self.dir_created);
        if !*created {
            transfer.create_dir_all(&self.root).or_raise(|| ErrorKind::Directory(self.root.clone()))?;
            debug!(bucket = %self.id, dir = %self.root.display(), "created bucket directory");
            *created = true;
        }
        Ok(())
    }

    pub fn is_dir_created(&self) -> bool {
        *lock(&self.dir_created)
    }
}
