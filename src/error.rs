use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("unable to set up logging")]
    Logging,
    #[display("unable to read source directory")]
    Discovery,
    #[display("partition run failed")]
    Run,
    #[display("unable to render report")]
    Report,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Run)
    }
}
