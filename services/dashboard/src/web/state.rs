//! services/dashboard/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;
use student_records_core::{CourseCatalog, RecordStore};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub catalog: Arc<CourseCatalog>,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>, catalog: Arc<CourseCatalog>) -> Self {
        Self { store, catalog }
    }
}
