use thiserror::Error;

/// Coarse grouping of failures, used for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Vault,
    Detection,
    RunFailed,
    PollTimeout,
    Output,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("BodyContent missing")]
    MissingBody,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing {0} header")]
    MissingAuthHeader(String),

    #[error("Missing skyflow_id")]
    MissingRecord,

    #[error("No downloadURL")]
    MissingDownloadUrl,

    #[error("Missing data format for redacted upload")]
    MissingDataFormat,

    #[error("Vault request failed ({stage}): {message}")]
    VaultRequest { stage: &'static str, message: String },

    #[error("Insert failed")]
    InsertFailed,

    #[error("No run_id")]
    MissingRunId,

    #[error("Detect request failed ({stage}): {message}")]
    DetectRequest { stage: &'static str, message: String },

    #[error("Run failed: {0}")]
    RunFailed(String),

    #[error("Polling timed out")]
    PollTimeout,

    #[error("No redacted output")]
    MissingRedactedOutput,

    #[error("Invalid redacted output: {0}")]
    InvalidRedactedOutput(String),

    #[error("Invalid entities output: {0}")]
    InvalidEntities(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingBody | Error::InvalidInput(_) | Error::MissingAuthHeader(_) => {
                ErrorKind::Input
            }
            Error::MissingRecord
            | Error::MissingDownloadUrl
            | Error::MissingDataFormat
            | Error::VaultRequest { .. }
            | Error::InsertFailed => ErrorKind::Vault,
            Error::MissingRunId | Error::DetectRequest { .. } => ErrorKind::Detection,
            Error::RunFailed(_) => ErrorKind::RunFailed,
            Error::PollTimeout => ErrorKind::PollTimeout,
            Error::MissingRedactedOutput
            | Error::InvalidRedactedOutput(_)
            | Error::InvalidEntities(_) => ErrorKind::Output,
        }
    }

    pub fn vault(stage: &'static str, message: impl Into<String>) -> Self {
        Error::VaultRequest {
            stage,
            message: message.into(),
        }
    }

    pub fn detect(stage: &'static str, message: impl Into<String>) -> Self {
        Error::DetectRequest {
            stage,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
