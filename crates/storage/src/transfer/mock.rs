//! In-memory [`Transfer`] for tests.
//!
//! Records every call and never touches the filesystem. A destination can only be written once (unless
//! overwriting), mirroring [`LocalTransfer`](super::LocalTransfer).

use super::{Transfer, TransferMode};
use crate::error::{ErrorKind, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferCall {
    CreateDir(PathBuf),
    Transfer { from: PathBuf, to: PathBuf },
}

#[derive(Debug, Default)]
pub struct MockTransfer {
    mode: TransferMode,
    overwrite: bool,
    calls: Mutex<Vec<TransferCall>>,
    written: Mutex<HashSet<PathBuf>>,
    /// Sources whose transfer should fail with an I/O error.
    failing: HashSet<PathBuf>,
}
impl MockTransfer {
    pub fn new(mode: TransferMode, overwrite: bool) -> Self {
        Self { mode, overwrite, ..Self::default() }
    }

    /// Make any transfer of the given source paths fail.
    pub fn failing<I: IntoIterator<Item = P>, P: Into<PathBuf>>(mut self, sources: I) -> Self {
        self.failing.extend(sources.into_iter().map(Into::into));
        self
    }

    pub fn calls(&self) -> Vec<TransferCall> {
        lock(&self.calls).clone()
    }

    pub fn created_dirs(&self) -> Vec<PathBuf> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                TransferCall::CreateDir(dir) => Some(dir.clone()),
                TransferCall::Transfer { .. } => None,
            })
            .collect()
    }

    /// Successful transfers, in call order.
    pub fn transfers(&self) -> Vec<(PathBuf, PathBuf)> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                TransferCall::Transfer { from, to } => Some((from.clone(), to.clone())),
                TransferCall::CreateDir(_) => None,
            })
            .collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Transfer for MockTransfer {
    fn mode(&self) -> TransferMode {
        self.mode
    }

    fn create_dir_all(&self, dir: &Path) -> Result<()> {
        lock(&self.calls).push(TransferCall::CreateDir(dir.to_path_buf()));
        Ok(())
    }

    fn transfer(&self, from: &Path, to: &Path) -> Result<()> {
        if self.failing.contains(from) {
            exn::bail!(ErrorKind::Io(std::io::Error::other("mock transfer failure")));
        }
        if !lock(&self.written).insert(to.to_path_buf()) && !self.overwrite {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
        }
        lock(&self.calls).push(TransferCall::Transfer { from: from.to_path_buf(), to: to.to_path_buf() });
        Ok(())
    }
}
