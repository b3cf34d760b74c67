use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration problems. None of these are worth retrying; the user has to fix their input.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("unable to load configuration: {_0}")]
    Load(#[error(not(source))] String),
    #[display("configuration file not found: {}", _0.display())]
    FileNotFound(#[error(not(source))] PathBuf),
    #[display("missing required setting: {_0}")]
    Missing(#[error(not(source))] &'static str),
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    #[display("destination {} lies inside source {}", destination.display(), source.display())]
    DestinationInsideSource {
        #[error(not(source))]
        source: PathBuf,
        destination: PathBuf,
    },
    #[display("destination {} is not empty (pass --overwrite to use it anyway)", _0.display())]
    DestinationNotEmpty(#[error(not(source))] PathBuf),
    #[display("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        false
    }
}
