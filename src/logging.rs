//! Logging setup.
//!
//! Diagnostics go to stderr, filtered by `RUST_LOG` or the verbosity flag. Every planned or executed transfer is also
//! written, one line each, to `partition_<timestamp>.log` in the configured log directory.

use exn::ResultExt;
use mediapart_library::COMMAND_TARGET;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::Metadata;
use tracing_subscriber::filter::{EnvFilter, filter_fn};
use tracing_subscriber::prelude::*;

use crate::error::{ErrorKind, Result};

const DEFAULT_FILTER: &str = "mediapart=info,mediapart::commands=warn,warn";
const VERBOSE_FILTER: &str = "mediapart=debug,warn";

/// Name of the command log for a run started at `now`.
pub fn log_file_name(now: OffsetDateTime) -> Result<String> {
    let timestamp = now
        .format(format_description!("[year][month][day]_[hour][minute][second]"))
        .or_raise(|| ErrorKind::Logging)?;
    Ok(format!("partition_{timestamp}.log"))
}

fn is_command(metadata: &Metadata<'_>) -> bool {
    metadata.target() == COMMAND_TARGET
}

/// Install the global subscriber. Returns the path of the command log.
pub fn init(verbose: bool, log_dir: &Path) -> Result<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        true => EnvFilter::new(VERBOSE_FILTER),
        false => EnvFilter::new(DEFAULT_FILTER),
    });

    fs::create_dir_all(log_dir).or_raise(|| ErrorKind::Logging)?;
    let path = log_dir.join(log_file_name(OffsetDateTime::now_utc())?);
    let file = File::create(&path).or_raise(|| ErrorKind::Logging)?;

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);
    let commands = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(filter_fn(is_command));

    tracing_subscriber::registry().with(stderr).with(commands).try_init().or_raise(|| ErrorKind::Logging)?;
    Ok(path)
}
