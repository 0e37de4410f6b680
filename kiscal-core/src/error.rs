//! Error types for kiscal.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in kiscal operations.
#[derive(Error, Debug)]
pub enum KiscalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential file '{}' not found", .0.display())]
    CredentialsNotFound(PathBuf),

    #[error("Could not parse credential file '{}': {source}", path.display())]
    CredentialsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("User '{user}' cannot edit calendars owned by '{owner}'")]
    Forbidden { owner: String, user: String },

    #[error("Calendar not found: {0}")]
    NotFound(String),

    #[error("Could not use '{}' as storage root: {reason}", path.display())]
    StorageRoot { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for kiscal operations.
pub type KiscalResult<T> = Result<T, KiscalError>;
