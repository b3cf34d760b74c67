use clap::Parser;
use mediapart_library::Layout;
use mediapart_storage::TransferMode;
use serde::Serialize;
use std::path::PathBuf;

/// Partition a media library into one directory per year.
///
/// Years come from EXIF timestamps where available, otherwise from a directory in the file's path named after a
/// year. Nothing is written unless --no-dry-run is given.
#[derive(Debug, Parser)]
#[command(name = "mediapart", version, about, long_about)]
pub struct Cli {
    /// Root of the media library to partition
    #[arg(value_name = "SRC_DIR")]
    pub source: Option<PathBuf>,
    /// Directory to create the year buckets in
    #[arg(value_name = "DEST_DIR")]
    pub destination: Option<PathBuf>,
    /// Ignore files smaller than this many kilobytes (1 KB = 1000 bytes)
    #[arg(long, value_name = "KB")]
    pub min_kb: Option<u64>,
    /// Comma-separated list of extensions to include, case-insensitive
    #[arg(long, value_name = "EXT,...", value_delimiter = ',')]
    pub file_extensions: Option<Vec<String>>,
    /// Place files directly in their bucket instead of mirroring source directories
    #[arg(long)]
    pub flatten_subdirectories: bool,
    /// Move files instead of copying them
    #[arg(long)]
    pub use_move: bool,
    /// Allow a non-empty destination and replace existing files
    #[arg(long)]
    pub overwrite: bool,
    /// Actually copy or move files
    #[arg(long)]
    pub no_dry_run: bool,
    #[arg(long, value_name = "N")]
    pub num_workers: Option<usize>,
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,
    /// Expected number of files per bucket
    #[arg(long, value_name = "N")]
    pub bucket_capacity: Option<usize>,
    /// Target false-positive rate of the flatten-mode name filter
    #[arg(long, value_name = "RATE")]
    pub false_positive_rate: Option<f64>,
    /// Directory for the per-run command log
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings given on the command line. Absent values leave lower configuration layers untouched.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_kb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<TransferMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub false_positive_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            destination: self.destination.clone(),
            min_kb: self.min_kb,
            extensions: self.file_extensions.clone(),
            layout: self.flatten_subdirectories.then_some(Layout::Flatten),
            transfer: self.use_move.then_some(TransferMode::Move),
            overwrite: self.overwrite.then_some(true),
            dry_run: self.no_dry_run.then_some(false),
            workers: self.num_workers,
            queue_capacity: self.queue_capacity,
            bucket_capacity: self.bucket_capacity,
            false_positive_rate: self.false_positive_rate,
            log_dir: self.log_dir.clone(),
        }
    }
}
