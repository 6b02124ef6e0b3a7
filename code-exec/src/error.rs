use thiserror::Error;

/// Fatal runner failures.
///
/// Compile failures, timeouts and non-zero exits are not errors: they are
/// reported through [`crate::ExecutionStatus`] on a completed result. Only
/// conditions that stop the pipeline before a result can exist live here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid execution spec: {0}")]
    SpecParse(String),

    #[error("Sandbox infrastructure error: {0}")]
    Infrastructure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn spec(msg: impl Into<String>) -> Self {
        Error::SpecParse(msg.into())
    }

    pub(crate) fn infra(msg: impl Into<String>) -> Self {
        Error::Infrastructure(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SpecParse(e.to_string())
    }
}
