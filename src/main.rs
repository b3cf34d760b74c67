//! mediapart: partition a media library into one directory per year.

mod cli;
mod error;
mod logging;
mod progress;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use crate::progress::Progress;
use clap::Parser;
use exn::ResultExt;
use figment::providers::Serialized;
use mediapart_config::Config;
use mediapart_library::{Partitioner, RunReport};
use mediapart_storage::LocalDiscovery;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Some files could not be partitioned.
const EXIT_ITEM_FAILURES: u8 = 1;
/// Nothing was attempted: bad configuration or the run could not start.
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(report) if report.has_failures() => ExitCode::from(EXIT_ITEM_FAILURES),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = ?err, "mediapart failed");
            eprintln!("Error: {err:?}");
            ExitCode::from(EXIT_FATAL)
        },
    }
}

fn run(cli: &Cli) -> Result<RunReport> {
    let config =
        Config::load(cli.config.as_deref(), Serialized::globals(cli.overrides())).or_raise(|| ErrorKind::Config)?;
    let log_file = logging::init(cli.verbose, &config.log_dir)?;
    info!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        layout = ?config.layout,
        transfer = %config.transfer,
        command_log = %log_file.display(),
        "starting"
    );
    if config.dry_run {
        warn!("dry run: no files will be copied or moved (pass --no-dry-run to apply)");
    }

    let discovery = LocalDiscovery::new(&config.source, config.filter()).or_raise(|| ErrorKind::Discovery)?;
    let progress = Progress::new(!cli.no_progress);
    let report = Partitioner::new(discovery.root(), &config.destination, config.options())
        .with_transfer(Arc::new(config.local_transfer()))
        .run(&discovery, &progress)
        .or_raise(|| ErrorKind::Run)?;
    progress.finish();

    match cli.json {
        true => println!("{}", serde_json::to_string_pretty(&report).or_raise(|| ErrorKind::Report)?),
        false => print!("{report}"),
    }
    Ok(report)
}
