//! Path helpers shared by discovery and destination naming.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Returns `path` relative to `root`, normalized.
///
/// Fails with [`InvalidPath`](crate::error::ErrorKind::InvalidPath) when `path` does not live under `root`, when the
/// remainder is empty, or when it would climb back out of `root` through `..` components. Null bytes are rejected as
/// they truncate paths in C-based syscalls.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mediapart_storage::relative_to;
/// assert_eq!(relative_to("/media", "/media/2014/beach.jpg").unwrap(), Path::new("2014/beach.jpg"));
/// assert!(relative_to("/media", "/elsewhere/beach.jpg").is_err());
/// assert!(relative_to("/media", "/media/../beach.jpg").is_err());
/// ```
pub fn relative_to(root: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<PathBuf> {
    let invalid = || exn::Exn::from(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
    let remainder = path.as_ref().strip_prefix(root.as_ref()).map_err(|_| invalid())?;
    let mut components = Vec::new();
    for component in remainder.components() {
        match component {
            Component::Normal(s) => {
                if s.as_encoded_bytes().contains(&0) {
                    return Err(invalid());
                }
                components.push(s);
            },
            Component::CurDir => {},
            Component::RootDir | Component::Prefix(_) => return Err(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    return Err(invalid());
                }
            },
        }
    }
    match components.is_empty() {
        true => Err(invalid()),
        false => Ok(components.into_iter().collect()),
    }
}
