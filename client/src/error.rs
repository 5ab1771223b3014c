//! Error types for the docspace client
//!
//! All errors use thiserror for structured error handling.
//! `StoreError` is what the remote store client reports; `AppError` is what
//! the workspace components surface to the user.

use thiserror::Error;

/// Failure of a single request against the document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request never reached the store or no response came back.
    #[error("Network failure: {0}")]
    Network(String),

    /// The store answered with a non-success status.
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Rejected { status: 404, .. })
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("A delete is already in progress")]
    DeleteInProgress,

    #[error("No folder selected")]
    NoFolderSelected,

    #[error("No document selected")]
    NoDocumentSelected,

    #[error("Delete has not been requested")]
    DeleteNotConfirmed,

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
