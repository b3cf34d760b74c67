use super::error::{ErrorKind, Result};
use super::seen::SeenNames;
use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Upper bound on `name-N.ext` probes for a single file.
const MAX_PROBES: u32 = 1_000_000;

/// How files are arranged inside a bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Keep each file's path relative to the source root.
    #[default]
    Structured,
    /// Drop directories and keep only the file name, suffixing duplicates.
    Flatten,
}

/// Run-wide settings every bucket's namer is built from.
#[derive(Clone, Debug)]
pub struct Naming {
    pub layout: Layout,
    pub source_root: PathBuf,
    pub bucket_capacity: usize,
    pub false_positive_rate: f64,
}

/// Hands out collision-free destination paths within one bucket.
///
/// Names are never released, so a path returned once is never returned again for the rest of the run.
#[derive(Debug)]
pub struct DestinationNamer {
    layout: Layout,
    source_root: PathBuf,
    bucket_root: PathBuf,
    seen: Option<SeenNames>,
}

impl DestinationNamer {
    pub fn new(naming: &Naming, bucket_root: impl Into<PathBuf>) -> Self {
        let seen = match naming.layout {
            Layout::Flatten => Some(SeenNames::new(naming.bucket_capacity, naming.false_positive_rate)),
            Layout::Structured => None,
        };
        Self { layout: naming.layout, source_root: naming.source_root.clone(), bucket_root: bucket_root.into(), seen }
    }

    pub fn resolve(&mut self, source: &Path) -> Result<PathBuf> {
        match (self.layout, self.seen.as_mut()) {
            (Layout::Flatten, Some(seen)) => {
                let name = source.file_name().ok_or_raise(|| ErrorKind::NoFileName(source.to_path_buf()))?;
                let name = reserve(seen, name)?;
                Ok(self.bucket_root.join(name))
            },
            _ => {
                let relative = mediapart_storage::relative_to(&self.source_root, source)
                    .or_raise(|| ErrorKind::OutsideRoot(source.to_path_buf()))?;
                Ok(self.bucket_root.join(relative))
            },
        }
    }
}

/// Reserve `name` itself, or the first free `stem-N.ext` after it.
fn reserve(seen: &mut SeenNames, name: &OsStr) -> Result<OsString> {
    for attempt in 0..MAX_PROBES {
        let candidate = candidate(name, attempt);
        if seen.insert(&candidate) {
            return Ok(candidate);
        }
    }
    exn::bail!(ErrorKind::Exhausted { name: PathBuf::from(name), attempts: MAX_PROBES })
}

/// `photo.jpg` → `photo-N.jpg`, `a.tar.gz` → `a.tar-N.gz`, `.hidden` → `.hidden-N`.
fn candidate(name: &OsStr, attempt: u32) -> OsString {
    if attempt == 0 {
        return name.to_os_string();
    }
    let path = Path::new(name);
    let suffix = format!("-{attempt}");
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(extension)) => {
            let mut candidate = stem.to_os_string();
            candidate.push(suffix);
            candidate.push(".");
            candidate.push(extension);
            candidate
        },
        _ => {
            let mut candidate = name.to_os_string();
            candidate.push(suffix);
            candidate
        },
    }
}
