use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why a command stopped before or during submission.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("required configuration files are missing")]
    CacheFilesMissing(Vec<PathBuf>),

    #[error("no saved document is open")]
    NoDocument,

    #[error("document has no project")]
    NoProject,

    #[error("ClickUp API token not found")]
    MissingToken { auth_path: PathBuf },

    #[error("no ClickUp list ID configured for this project")]
    MissingListId { projects_path: PathBuf },

    #[error("custom field '{0}' not found on list")]
    MissingField(&'static str),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
