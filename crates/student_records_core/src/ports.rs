//! crates/student_records_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the remote REST resources and of where the local cache lives.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::{Course, Student, StudentId};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (HTTP, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote student collection (`GET`, `POST`, `PUT /{id}`, `DELETE /{id}`).
#[async_trait]
pub trait StudentResource: Send + Sync {
    async fn list_students(&self) -> PortResult<Vec<Student>>;

    /// Creates a student remotely. The body sent excludes `id`; the returned
    /// record carries the canonical id (the remote's, if it assigned one).
    async fn create_student(&self, student: &Student) -> PortResult<Student>;

    async fn replace_student(&self, student: &Student) -> PortResult<()>;

    async fn delete_student(&self, id: &StudentId) -> PortResult<()>;
}

/// The remote, read-only course collection.
#[async_trait]
pub trait CourseResource: Send + Sync {
    async fn list_courses(&self) -> PortResult<Vec<Course>>;
}

/// Key-value persisted storage for last-known-good JSON snapshots.
///
/// Access is synchronous: the cache is written right after each in-memory
/// mutation and read once at startup.
pub trait LocalCache: Send + Sync {
    fn read(&self, key: &str) -> PortResult<Option<String>>;

    fn write(&self, key: &str, value: &str) -> PortResult<()>;
}

//=========================================================================================
// In-Memory Cache
//=========================================================================================

/// A `LocalCache` that lives only as long as the process.
///
/// Used when no persistent location is available, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache pre-seeded with one entry.
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let cache = Self::new();
        cache.entries.write().insert(key.to_string(), value.into());
        cache
    }
}

impl LocalCache for InMemoryCache {
    fn read(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
