//! crates/student_records_core/src/error.rs
//!
//! Defines the error type surfaced by store operations.

use crate::domain::StudentId;
use crate::ports::PortError;
use crate::validation::ValidationErrors;

/// Every failure a `RecordStore` or `CourseCatalog` operation can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Field-level problems with a candidate; nothing was sent to the remote.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The update/remove target is not in the in-memory list.
    #[error("Student {0} not found")]
    NotFound(StudentId),

    /// An add supplied an id that is already in use.
    #[error("Student {0} already exists")]
    AlreadyExists(StudentId),

    /// Another mutation of the same record has not finished yet.
    #[error("Another change to student {0} is still in progress")]
    Busy(StudentId),

    /// Network failure or non-2xx response from the remote resource.
    #[error("Remote resource error: {0}")]
    Remote(String),

    /// The local cache could not be read or written. Non-fatal.
    #[error("Local cache unavailable: {0}")]
    CacheUnavailable(String),
}

impl StoreError {
    pub(crate) fn remote(err: PortError) -> Self {
        StoreError::Remote(err.to_string())
    }

    pub(crate) fn cache(err: impl std::fmt::Display) -> Self {
        StoreError::CacheUnavailable(err.to_string())
    }
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;
