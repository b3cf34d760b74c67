//! Candidate file discovery.
//!
//! A [`Discovery`] hands out a lazy, finite sequence of file paths. Each call to [`Discovery::discover`] starts a
//! fresh pass, so callers may walk once to count and again to enqueue.

use crate::error::{ErrorKind, Result};
use std::collections::HashSet;
use std::fs::{self, DirEntry, ReadDir};
use std::path::{Path, PathBuf};
use tracing::{instrument, warn};

/// Source of candidate media files.
pub trait Discovery: Send + Sync {
    /// Start a new pass over the candidate files.
    fn discover(&self) -> Box<dyn Iterator<Item = PathBuf> + Send + '_>;
}

/// A fixed list of paths, yielded as-is.
impl Discovery for Vec<PathBuf> {
    fn discover(&self) -> Box<dyn Iterator<Item = PathBuf> + Send + '_> {
        Box::new(self.iter().cloned())
    }
}

/// Extension and size criteria a file must meet to be considered.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// Lowercase, without the leading dot. Empty accepts every extension.
    extensions: HashSet<String>,
    min_bytes: u64,
}
impl Filter {
    /// Extensions are matched case-insensitively. A file passes the size check once its size in whole kilobytes
    /// (1 KB = 1000 bytes) reaches `min_kb`.
    pub fn new<I, S>(extensions: I, min_kb: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions, min_bytes: min_kb.saturating_mul(1000) }
    }

    pub fn accepts_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
    }

    pub fn accepts_size(&self, bytes: u64) -> bool {
        bytes >= self.min_bytes
    }
}

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

/// Recursive walk of a local directory tree.
///
/// Unreadable directories and entries are logged and skipped. Symlinks to files are followed, symlinks to
/// directories are not (they are the easiest way to end up walking in circles).
#[derive(Clone, Debug)]
pub struct LocalDiscovery {
    root: PathBuf,
    filter: Filter,
}
impl LocalDiscovery {
    pub fn new(root: impl AsRef<Path>, filter: Filter) -> Result<Self> {
        let root = root.as_ref();
        let root = std::path::absolute(root).map_err(|e| ErrorKind::from_io(e, root))?;
        if !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { root, filter })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn process_entry(&self, entry: DirEntry) -> Result<WalkEntry> {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ErrorKind::from_io(e, &path))?;
        if file_type.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if !self.filter.accepts_extension(&path) {
            return Ok(WalkEntry::Skip);
        }
        // Follows symlinks, unlike `DirEntry::metadata`.
        let metadata = fs::metadata(&path).map_err(|e| ErrorKind::from_io(e, &path))?;
        if metadata.is_file() && self.filter.accepts_size(metadata.len()) {
            return Ok(WalkEntry::File(path));
        }
        Ok(WalkEntry::Skip)
    }
}

impl Discovery for LocalDiscovery {
    #[instrument(level = "trace", skip(self), fields(root = %self.root.display()))]
    fn discover(&self) -> Box<dyn Iterator<Item = PathBuf> + Send + '_> {
        Box::new(Walk { discovery: self, stack: vec![self.root.clone()], current: None })
    }
}

struct Walk<'a> {
    discovery: &'a LocalDiscovery,
    stack: Vec<PathBuf>,
    current: Option<(PathBuf, ReadDir)>,
}

impl Iterator for Walk<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let Some((dir, entries)) = self.current.as_mut() else {
                let dir = self.stack.pop()?;
                match fs::read_dir(&dir) {
                    Ok(entries) => self.current = Some((dir, entries)),
                    Err(err) => warn!(dir = %dir.display(), error = %err, "skipping unreadable directory"),
                }
                continue;
            };
            let entry = match entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    warn!(dir = %dir.display(), error = %err, "skipping unreadable directory entry");
                    continue;
                },
                None => {
                    self.current = None;
                    continue;
                },
            };
            match self.discovery.process_entry(entry) {
                Ok(WalkEntry::File(path)) => return Some(path),
                Ok(WalkEntry::Descend(dir)) => self.stack.push(dir),
                Ok(WalkEntry::Skip) => {},
                Err(err) => warn!(error = %*err, "skipping file"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, bytes: usize) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; bytes]).unwrap();
    }

    fn relative_set(discovery: &LocalDiscovery) -> BTreeSet<String> {
        discovery
            .discover()
            .map(|p| p.strip_prefix(discovery.root()).unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[rstest]
    #[case("photo.jpg", true)]
    #[case("photo.JPG", true)]
    #[case("clip.Mov", true)]
    #[case("notes.txt", false)]
    #[case("README", false)]
    #[case(".jpg", false)]
    fn test_extension_filter(#[case] name: &str, #[case] expected: bool) {
        let filter = Filter::new(["JPG", ".mov"], 0);
        assert_eq!(filter.accepts_extension(Path::new(name)), expected);
    }

    #[test]
    fn test_empty_extension_list_accepts_everything() {
        let filter = Filter::new(Vec::<String>::new(), 0);
        assert!(filter.accepts_extension(Path::new("anything.xyz")));
        assert!(filter.accepts_extension(Path::new("no-extension")));
    }

    #[rstest]
    #[case(0, 0, true)]
    #[case(1, 999, false)]
    #[case(1, 1000, true)]
    #[case(2, 1999, false)]
    #[case(2, 2000, true)]
    fn test_size_filter(#[case] min_kb: u64, #[case] bytes: u64, #[case] expected: bool) {
        assert_eq!(Filter::new(["jpg"], min_kb).accepts_size(bytes), expected);
    }

    #[test]
    fn test_walk_recurses_and_filters() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.jpg", 2000);
        write(tmp.path(), "2014/b.PNG", 2000);
        write(tmp.path(), "2014/deep/er/c.jpg", 2000);
        write(tmp.path(), "2014/tiny.jpg", 10);
        write(tmp.path(), "2014/notes.txt", 2000);
        let discovery = LocalDiscovery::new(tmp.path(), Filter::new(["jpg", "png"], 1)).unwrap();
        let expected: BTreeSet<String> = ["a.jpg", "2014/b.PNG", "2014/deep/er/c.jpg"].map(String::from).into();
        assert_eq!(relative_set(&discovery), expected);
    }

    #[test]
    fn test_discover_is_restartable() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "x/one.jpg", 10);
        write(tmp.path(), "two.jpg", 10);
        let discovery = LocalDiscovery::new(tmp.path(), Filter::new(["jpg"], 0)).unwrap();
        assert_eq!(discovery.discover().count(), 2);
        assert_eq!(discovery.discover().count(), 2);
    }

    #[test]
    fn test_empty_tree() {
        let tmp = TempDir::new().unwrap();
        let discovery = LocalDiscovery::new(tmp.path(), Filter::default()).unwrap();
        assert_eq!(discovery.discover().count(), 0);
    }

    #[test]
    fn test_root_must_be_directory() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "file.jpg", 1);
        let err = LocalDiscovery::new(tmp.path().join("file.jpg"), Filter::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
        let err = LocalDiscovery::new(tmp.path().join("missing"), Filter::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_symlinks_not_followed() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "real/a.jpg", 10);
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("loop")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real/a.jpg"), tmp.path().join("link.jpg")).unwrap();
        let discovery = LocalDiscovery::new(tmp.path(), Filter::new(["jpg"], 0)).unwrap();
        let expected: BTreeSet<String> = ["real/a.jpg", "link.jpg"].map(String::from).into();
        assert_eq!(relative_set(&discovery), expected);
    }

    #[test]
    fn test_static_list() {
        let list = vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")];
        assert_eq!(list.discover().collect::<Vec<_>>(), list);
    }
}
