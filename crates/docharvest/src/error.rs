//! Error types for DocHarvest

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a single document
///
/// These are per-task errors: the harvester logs and counts them, then
/// moves on to the next task.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service understood the request but refused it
    #[error("Document rejected (code {code}): {message}")]
    Rejected { code: i64, message: String },
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            FetchError::InvalidResponse(err.to_string())
        } else {
            FetchError::RequestError(err.to_string())
        }
    }

    /// True for failures below the application layer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::ClientBuildError(_)
                | FetchError::Timeout
                | FetchError::ConnectError(_)
                | FetchError::HttpStatus(_)
                | FetchError::RequestError(_)
        )
    }
}

/// HTML could not be converted to markdown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// A tag was opened but never closed
    #[error("Unterminated tag at byte {0}")]
    UnterminatedTag(usize),

    /// A comment was opened but never closed
    #[error("Unterminated comment at byte {0}")]
    UnterminatedComment(usize),
}

/// Errors that abort a whole harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Category index file does not exist
    #[error("Category index not found: {}", .0.display())]
    IndexNotFound(PathBuf),

    /// Input file could not be read
    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Category index file is not valid JSON of the expected shape
    #[error("Invalid category index {}: {source}", .path.display())]
    InvalidIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Previously written document set could not be parsed
    #[error("Invalid documents file {}: {source}", .path.display())]
    InvalidDocuments {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP client could not be created
    #[error(transparent)]
    Client(#[from] FetchError),

    /// Report or output write failed
    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Report serialization failed
    #[error("Failed to serialize report")]
    Serialize(#[source] serde_json::Error),
}
