//! Layered configuration for mediapart.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults,
//! 2. `mediapart.toml` in the user's config directory,
//! 3. an explicit file (`--config` or `MEDIAPART_CONFIG`; TOML, YAML or JSON by extension),
//! 4. `MEDIAPART_*` environment variables,
//! 5. whatever the caller merges last (command-line flags).

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::{
    Figment, Provider,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use mediapart_library::{Layout, Options};
use mediapart_storage::{Filter, LocalTransfer, TransferMode};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_PREFIX: &str = "MEDIAPART_";
pub const ENV_CONFIG_FILE: &str = "MEDIAPART_CONFIG";
pub const DEFAULT_EXTENSIONS: [&str; 17] = [
    "BMP", "CUR", "EMF", "ICO", "GIF", "JPG", "JPEG", "PCX", "PNG", "TGA", "TIFF", "WMF", "XCF", "MKV", "WMV", "MOV",
    "AVI",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the media library to partition.
    pub source: PathBuf,
    /// Root under which the year buckets are created.
    pub destination: PathBuf,
    pub min_kb: u64,
    #[serde(deserialize_with = "list_or_csv")]
    pub extensions: Vec<String>,
    pub layout: Layout,
    pub transfer: TransferMode,
    pub overwrite: bool,
    pub dry_run: bool,
    pub workers: usize,
    pub queue_capacity: usize,
    pub queue_poll_secs: u64,
    pub bucket_capacity: usize,
    pub false_positive_rate: f64,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let options = Options::default();
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            min_kb: 1,
            extensions: DEFAULT_EXTENSIONS.map(String::from).to_vec(),
            layout: options.layout,
            transfer: TransferMode::default(),
            overwrite: false,
            dry_run: options.dry_run,
            workers: options.workers,
            queue_capacity: options.queue_capacity,
            queue_poll_secs: options.queue_poll.as_secs(),
            bucket_capacity: options.bucket_capacity,
            false_positive_rate: options.false_positive_rate,
            log_dir: PathBuf::from("."),
        }
    }
}

/// Accept either a list or a comma-separated string, so `MEDIAPART_EXTENSIONS=jpg,png` works.
fn list_or_csv<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Csv(String),
    }
    let values = match Raw::deserialize(deserializer)? {
        Raw::List(list) => list,
        Raw::Csv(csv) => csv.split(',').map(String::from).collect(),
    };
    Ok(values.into_iter().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect())
}

fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "mediapart").map(|dirs| dirs.config_dir().join("mediapart.toml"))
}

fn merge_file(figment: Figment, file: &Path) -> Figment {
    match file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
        Some("json") => figment.merge(Json::file(file)),
        _ => figment.merge(Toml::file(file)),
    }
}

impl Config {
    /// The explicit config file, if any: the argument wins over `MEDIAPART_CONFIG`.
    fn explicit_file(file: Option<&Path>) -> Option<PathBuf> {
        file.map(Path::to_path_buf).or_else(|| std::env::var_os(ENV_CONFIG_FILE).map(PathBuf::from))
    }

    /// Defaults, config files and environment merged together.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(user) = user_config_file() {
            figment = figment.merge(Toml::file(user));
        }
        if let Some(file) = Self::explicit_file(file) {
            figment = merge_file(figment, &file);
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Build the figment from all sources, then merge `overrides` on top.
    pub fn figment_with<T: Provider>(file: Option<&Path>, overrides: T) -> Figment {
        Self::figment(file).merge(overrides)
    }

    pub fn extract_from<T: Provider>(provider: T) -> Result<Self> {
        Figment::from(provider).extract().map_err(|e| ErrorKind::Load(e.to_string()).into())
    }

    /// Load from every source plus `overrides`, then validate.
    pub fn load<T: Provider>(file: Option<&Path>, overrides: T) -> Result<Self> {
        if let Some(file) = Self::explicit_file(file)
            && !file.is_file()
        {
            exn::bail!(ErrorKind::FileNotFound(file));
        }
        let config = Self::extract_from(Self::figment_with(file, overrides))?;
        config.validate()?;
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Missing("source"));
        }
        if self.destination.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Missing("destination"));
        }
        let source = existing_dir(&self.source)?;
        let destination = existing_dir(&self.destination)?;
        if destination.starts_with(&source) {
            exn::bail!(ErrorKind::DestinationInsideSource { source, destination });
        }
        if !self.overwrite {
            let mut entries =
                fs::read_dir(&destination).or_raise(|| ErrorKind::NotADirectory(destination.clone()))?;
            if entries.next().is_some() {
                exn::bail!(ErrorKind::DestinationNotEmpty(destination));
            }
        }
        if self.workers == 0 {
            exn::bail!(ErrorKind::Invalid { key: "workers", reason: "must be at least 1" });
        }
        if self.queue_capacity == 0 {
            exn::bail!(ErrorKind::Invalid { key: "queue_capacity", reason: "must be at least 1" });
        }
        if self.bucket_capacity == 0 {
            exn::bail!(ErrorKind::Invalid { key: "bucket_capacity", reason: "must be at least 1" });
        }
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            exn::bail!(ErrorKind::Invalid { key: "false_positive_rate", reason: "must lie strictly between 0 and 1" });
        }
        if self.extensions.is_empty() {
            exn::bail!(ErrorKind::Invalid { key: "extensions", reason: "at least one extension is required" });
        }
        Ok(())
    }

    pub fn queue_poll(&self) -> Duration {
        Duration::from_secs(self.queue_poll_secs)
    }

    /// Settings for the partitioning engine.
    pub fn options(&self) -> Options {
        Options {
            layout: self.layout,
            dry_run: self.dry_run,
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            queue_poll: self.queue_poll(),
            bucket_capacity: self.bucket_capacity,
            false_positive_rate: self.false_positive_rate,
        }
    }

    pub fn filter(&self) -> Filter {
        Filter::new(&self.extensions, self.min_kb)
    }

    pub fn local_transfer(&self) -> LocalTransfer {
        LocalTransfer::new(self.transfer, self.overwrite)
    }
}

fn existing_dir(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(canonical) if canonical.is_dir() => Ok(canonical),
        _ => exn::bail!(ErrorKind::NotADirectory(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    fn dirs() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::create_dir(tmp.path().join("dst")).unwrap();
        let config =
            Config { source: tmp.path().join("src"), destination: tmp.path().join("dst"), ..Config::default() };
        (tmp, config)
    }

    #[test]
    fn test_defaults() {
        let config = Config::extract_from(base()).unwrap();
        assert_eq!(config.min_kb, 1);
        assert_eq!(config.extensions.len(), 17);
        assert_eq!(config.layout, Layout::Structured);
        assert_eq!(config.transfer, TransferMode::Copy);
        assert!(config.dry_run);
        assert!(!config.overwrite);
        assert_eq!(config.workers, 10);
        assert_eq!(config.queue_capacity, 10_000);
        assert_eq!(config.queue_poll(), Duration::from_secs(30));
        assert_eq!(config.bucket_capacity, 50_000);
        assert_eq!(config.false_positive_rate, 0.001);
    }

    #[test]
    fn test_toml_layer() {
        let toml = r#"
            source = "/media/library"
            destination = "/media/sorted"
            layout = "flatten"
            transfer = "move"
            workers = 4
            extensions = ["jpg", "png"]
        "#;
        let config = Config::extract_from(base().merge(Toml::string(toml))).unwrap();
        assert_eq!(config.source, PathBuf::from("/media/library"));
        assert_eq!(config.layout, Layout::Flatten);
        assert_eq!(config.transfer, TransferMode::Move);
        assert_eq!(config.workers, 4);
        assert_eq!(config.extensions, vec!["jpg", "png"]);
        // Untouched keys keep their defaults.
        assert_eq!(config.queue_capacity, 10_000);
    }

    #[test]
    fn test_overrides_win() {
        let figment = base().merge(Toml::string("workers = 4")).merge(("workers", 2usize));
        assert_eq!(Config::extract_from(figment).unwrap().workers, 2);
    }

    #[test]
    fn test_csv_extensions() {
        let figment = base().merge(("extensions", "jpg, PNG,,mov"));
        assert_eq!(Config::extract_from(figment).unwrap().extensions, vec!["jpg", "PNG", "mov"]);
    }

    #[test]
    fn test_bad_value() {
        let err = Config::extract_from(base().merge(("layout", "sideways"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load(_)));
    }

    #[rstest]
    #[case("yaml", "workers: 3\n")]
    #[case("json", "{\"workers\": 3}")]
    #[case("toml", "workers = 3\n")]
    fn test_explicit_file_formats(#[case] ext: &str, #[case] contents: &str) {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join(format!("settings.{ext}"));
        fs::write(&file, contents).unwrap();
        let config = Config::extract_from(merge_file(base(), &file)).unwrap();
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml")), ("workers", 1usize)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::FileNotFound(_)));
    }

    #[test]
    fn test_valid() {
        let (_tmp, config) = dirs();
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_source() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Missing("source")));
    }

    #[test]
    fn test_source_not_a_directory() {
        let (tmp, config) = dirs();
        let config = Config { source: tmp.path().join("nope"), ..config };
        assert!(matches!(&*config.validate().unwrap_err(), ErrorKind::NotADirectory(_)));
    }

    #[test]
    fn test_destination_inside_source() {
        let (tmp, config) = dirs();
        fs::create_dir(tmp.path().join("src/out")).unwrap();
        let config = Config { destination: tmp.path().join("src/out"), ..config };
        assert!(matches!(&*config.validate().unwrap_err(), ErrorKind::DestinationInsideSource { .. }));
    }

    #[test]
    fn test_destination_not_empty() {
        let (tmp, config) = dirs();
        fs::write(tmp.path().join("dst/leftover.jpg"), b"x").unwrap();
        assert!(matches!(&*config.validate().unwrap_err(), ErrorKind::DestinationNotEmpty(_)));
        Config { overwrite: true, ..config }.validate().unwrap();
    }

    #[rstest]
    #[case(Config { workers: 0, ..Config::default() }, "workers")]
    #[case(Config { queue_capacity: 0, ..Config::default() }, "queue_capacity")]
    #[case(Config { bucket_capacity: 0, ..Config::default() }, "bucket_capacity")]
    #[case(Config { false_positive_rate: 0.0, ..Config::default() }, "false_positive_rate")]
    #[case(Config { false_positive_rate: 1.0, ..Config::default() }, "false_positive_rate")]
    #[case(Config { extensions: vec![], ..Config::default() }, "extensions")]
    fn test_invalid(#[case] overrides: Config, #[case] expected: &str) {
        let (_tmp, paths) = dirs();
        let config = Config { source: paths.source, destination: paths.destination, ..overrides };
        match &*config.validate().unwrap_err() {
            ErrorKind::Invalid { key, .. } => assert_eq!(*key, expected),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_options() {
        let config = Config { layout: Layout::Flatten, dry_run: false, workers: 3, ..Config::default() };
        let options = config.options();
        assert_eq!(options.layout, Layout::Flatten);
        assert!(!options.dry_run);
        assert_eq!(options.workers, 3);
        assert_eq!(options.queue_poll, Duration::from_secs(30));
    }
}
