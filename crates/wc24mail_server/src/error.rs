//! Error types for the mail gateway.

use thiserror::Error;

/// Result type for gateway operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Result type for account store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that stop the gateway from starting or serving.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration file is missing fields or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Salt file exists but cannot be used.
    #[error("invalid salt: {0}")]
    Salt(String),

    /// Account store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by an account store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query or update failed.
    #[error("query failed: {0}")]
    Query(String),
}

/// Errors returned by a config patcher.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The uploaded blob is not a usable mail configuration.
    #[error("invalid mail configuration: {0}")]
    InvalidConfig(String),

    /// No patcher is installed.
    #[error("config patching is not available on this server")]
    Unavailable,

    /// The account store failed while patching.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors reading the uploaded configuration from a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The request body is not a parseable form.
    #[error("malformed form: {0}")]
    MalformedForm(String),

    /// The form has no file under the expected field name.
    #[error("no file was uploaded in field `{0}`")]
    MissingFile(String),

    /// The file part could not be read.
    #[error("unable to read upload: {0}")]
    Unreadable(String),
}

impl UploadError {
    /// Returns true when the failure is in the form framing itself.
    pub fn is_malformed_form(&self) -> bool {
        matches!(self, UploadError::MalformedForm(_))
    }
}
