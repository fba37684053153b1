//! Error types for the batch driver.

use thiserror::Error;

use ctsearch_engine::LinkDbError;
use ctsearch_loader::CodeMapError;

/// Errors that stop a whole command.
///
/// Failures of individual links are not errors at this level; they are
/// collected in the run report.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error reading the link list.
    #[error("CSV error in link list: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The link list has no `URL` column.
    #[error("Link list {path} has no URL column")]
    MissingUrlColumn {
        /// The link list path.
        path: String,
    },

    /// The saved-search export is not an array of objects.
    #[error("Saved search export entry {index} is not an object with a numeric search_id")]
    InvalidSavedSearch {
        /// Position of the entry in the export.
        index: usize,
    },

    /// Error loading the code translation table.
    #[error(transparent)]
    CodeMap(#[from] CodeMapError),

    /// Error reading or writing the link collection.
    #[error(transparent)]
    LinkDb(#[from] LinkDbError),

    /// A link task panicked or was cancelled.
    #[error("Link task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for batch driver operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
