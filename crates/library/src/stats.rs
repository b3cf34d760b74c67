//! Run statistics shared by every worker.

use crate::classify::{BucketId, Method};
use crate::lock;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Breakdown {
    by_method: BTreeMap<Method, u64>,
    by_bucket: BTreeMap<BucketId, u64>,
    by_file_type: BTreeMap<String, u64>,
}

/// Counters updated concurrently by workers and read once the pool has drained.
#[derive(Debug)]
pub struct RunStatistics {
    started: Instant,
    discovered: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    breakdown: Mutex<Breakdown>,
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStatistics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            discovered: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            breakdown: Mutex::new(Breakdown::default()),
        }
    }

    pub fn record_discovered(&self, count: u64) {
        self.discovered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_success(&self, bucket: BucketId, method: Method, file_type: &str) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        let mut breakdown = lock(&self.breakdown);
        *breakdown.by_method.entry(method).or_default() += 1;
        *breakdown.by_bucket.entry(bucket).or_default() += 1;
        *breakdown.by_file_type.entry(file_type.to_string()).or_default() += 1;
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Copy the counters into a report. Only meaningful once every worker has been joined.
    pub fn snapshot(&self, dry_run: bool) -> RunReport {
        let breakdown = lock(&self.breakdown);
        RunReport {
            discovered: self.discovered(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            by_method: breakdown.by_method.clone(),
            by_bucket: breakdown.by_bucket.clone(),
            by_file_type: breakdown.by_file_type.clone(),
            duration: self.started.elapsed(),
            dry_run,
        }
    }
}

/// Lowercase extension of `path`, or the empty string if it has none.
pub fn file_type(path: &Path) -> String {
    path.extension().map(|ext| ext.to_string_lossy().to_lowercase()).unwrap_or_default()
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Final tallies of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    pub discovered: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub by_method: BTreeMap<Method, u64>,
    pub by_bucket: BTreeMap<BucketId, u64>,
    pub by_file_type: BTreeMap<String, u64>,
    #[serde(rename = "duration_secs", serialize_with = "as_secs")]
    pub duration: Duration,
    pub dry_run: bool,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "Planned" } else { "Partitioned" };
        writeln!(
            f,
            "{verb} {} of {} files ({} failed) in {:.2}s{}",
            self.succeeded,
            self.discovered,
            self.failed,
            self.duration.as_secs_f64(),
            if self.dry_run { " [dry run]" } else { "" },
        )?;
        write_section(f, "By method", self.by_method.iter().map(|(k, v)| (k.to_string(), *v)))?;
        write_section(f, "By bucket", self.by_bucket.iter().map(|(k, v)| (k.to_string(), *v)))?;
        write_section(
            f,
            "By file type",
            self.by_file_type.iter().map(|(k, v)| (if k.is_empty() { "(none)".to_string() } else { k.clone() }, *v)),
        )
    }
}

fn write_section(f: &mut Formatter<'_>, title: &str, rows: impl Iterator<Item = (String, u64)>) -> fmt::Result {
    let rows: Vec<_> = rows.collect();
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title}:")?;
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, count) in rows {
        writeln!(f, "  {label:<width$}  {count}")?;
    }
    Ok(())
}
