pub mod analytics;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod export;
pub mod ports;
pub mod store;
pub mod validation;
pub mod views;

pub use analytics::{Analytics, CourseShare, DailyCount, DashboardStats, DomainCount};
pub use catalog::{CatalogSnapshot, CourseCatalog, COURSES_CACHE_KEY};
pub use domain::{Course, CourseId, RecordId, Student, StudentDraft, StudentId};
pub use error::{StoreError, StoreResult};
pub use export::{ExportError, ExportField, ExportFormat};
pub use ports::{
    CourseResource, InMemoryCache, LocalCache, PortError, PortResult, StudentResource,
};
pub use store::{LoadOutcome, RecordStore, Snapshot, StoreSnapshot, StoreStatus, STUDENTS_CACHE_KEY};
pub use validation::{Field, ValidationErrors};
pub use views::{SortKey, SortOrder, ViewQuery};
