use super::{Transfer, TransferMode};
use crate::error::{ErrorKind, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::instrument;

/// Transfers files on the local filesystem.
///
/// Copies preserve permissions and the modification time, and either land complete or not at all. Moves are a rename, falling back to copy-then-delete when
/// source and destination sit on different filesystems.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalTransfer {
    mode: TransferMode,
    overwrite: bool,
}
impl LocalTransfer {
    pub fn new(mode: TransferMode, overwrite: bool) -> Self {
        Self { mode, overwrite }
    }

    /// Copy into a temporary file beside `to`, then rename it into place. A failed copy leaves nothing behind.
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        if !self.overwrite && fs::symlink_metadata(to).is_ok() {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
        }
        let mut source = File::open(from).map_err(|e| ErrorKind::from_io(e, from))?;
        let metadata = source.metadata().map_err(|e| ErrorKind::from_io(e, from))?;
        let dir = to.parent().filter(|parent| !parent.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let mut staged = tempfile::Builder::new()
            .prefix(".mediapart-")
            .tempfile_in(dir)
            .map_err(|e| ErrorKind::from_io(e, dir))?;
        io::copy(&mut source, &mut staged).map_err(|e| ErrorKind::from_io(e, from))?;
        let file = staged.as_file();
        file.set_permissions(metadata.permissions()).map_err(|e| ErrorKind::from_io(e, to))?;
        if let Ok(modified) = metadata.modified() {
            file.set_modified(modified).map_err(|e| ErrorKind::from_io(e, to))?;
        }
        let persisted = match self.overwrite {
            true => staged.persist(to),
            false => staged.persist_noclobber(to),
        };
        persisted.map_err(|e| ErrorKind::from_io(e.error, to))?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        // `rename` silently replaces the target on Unix.
        if !self.overwrite && fs::symlink_metadata(to).is_ok() {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
        }
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
                self.copy(from, to)?;
                if let Err(err) = fs::remove_file(from) {
                    // Keep the source as the only copy.
                    let _ = fs::remove_file(to);
                    return Err(ErrorKind::from_io(err, from).into());
                }
                Ok(())
            },
            Err(err) => Err(ErrorKind::from_io(err, from).into()),
        }
    }
}

impl Transfer for LocalTransfer {
    fn mode(&self) -> TransferMode {
        self.mode
    }

    fn create_dir_all(&self, dir: &Path) -> Result<()> {
        Ok(fs::create_dir_all(dir).map_err(|e| ErrorKind::from_io(e, dir))?)
    }

    #[instrument(level = "trace", skip(self), fields(mode = %self.mode))]
    fn transfer(&self, from: &Path, to: &Path) -> Result<()> {
        // Structured layouts nest below the bucket directory.
        if let Some(parent) = to.parent()
            && !parent.is_dir()
        {
            self.create_dir_all(parent)?;
        }
        match self.mode {
            TransferMode::Copy => self.copy(from, to),
            TransferMode::Move => self.rename(from, to),
        }
    }
}
