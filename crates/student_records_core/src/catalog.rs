//! crates/student_records_core/src/catalog.rs
//!
//! Read-only course reference data: fetched once per session, re-fetched only
//! on an explicit retry, and mirrored into the local cache like the students.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use crate::domain::Course;
use crate::error::StoreResult;
use crate::ports::{CourseResource, LocalCache};
use crate::store::{
    read_cached, write_cached, CollectionState, LoadOutcome, Snapshot, StoreStatus,
};

pub const COURSES_CACHE_KEY: &str = "courses";

pub type CatalogSnapshot = Snapshot<Course>;

pub struct CourseCatalog {
    resource: Arc<dyn CourseResource>,
    cache: Arc<dyn LocalCache>,
    state: RwLock<CollectionState<Course>>,
    fetch_gate: tokio::sync::Mutex<()>,
    loaded: AtomicBool,
}

impl CourseCatalog {
    pub fn new(resource: Arc<dyn CourseResource>, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            resource,
            cache,
            state: RwLock::new(CollectionState::default()),
            fetch_gate: tokio::sync::Mutex::new(()),
            loaded: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().snapshot()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.state.read().items.clone()
    }

    /// Seeds the course list from the local cache.
    pub fn hydrate(&self) -> StoreResult<usize> {
        let mut state = self.state.write();
        match read_cached::<Course>(self.cache.as_ref(), COURSES_CACHE_KEY) {
            Ok(cached) => {
                state.items = cached.unwrap_or_default();
                debug!(count = state.items.len(), "Hydrated courses from local cache");
                Ok(state.items.len())
            }
            Err(err) => {
                warn!(error = %err, "Could not read cached courses");
                Err(state.fail(err))
            }
        }
    }

    /// Fetches the courses unless a fetch already succeeded this session.
    pub async fn load(&self) -> StoreResult<LoadOutcome> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(LoadOutcome::Coalesced);
        }
        self.fetch().await
    }

    /// Re-fetches unconditionally and replaces the course set on success.
    pub async fn retry(&self) -> StoreResult<LoadOutcome> {
        self.fetch().await
    }

    pub fn clear_error(&self) {
        self.state.write().clear_error();
    }

    async fn fetch(&self) -> StoreResult<LoadOutcome> {
        let _gate = match self.fetch_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => {
                let _wait = self.fetch_gate.lock().await;
                return Ok(LoadOutcome::Coalesced);
            }
        };

        {
            let mut state = self.state.write();
            state.status = StoreStatus::Loading;
            state.error = None;
        }

        let fetched = self.resource.list_courses().await;
        let cached = match &fetched {
            Ok(_) => None,
            Err(e) => {
                error!(error = %e, "Failed to fetch courses");
                read_cached::<Course>(self.cache.as_ref(), COURSES_CACHE_KEY)
                    .unwrap_or_else(|err| {
                        warn!(error = %err, "Cached courses unavailable");
                        None
                    })
            }
        };

        let cache = self.cache.as_ref();
        let outcome = self.state.write().settle_load(fetched, cached, |items| {
            write_cached(cache, COURSES_CACHE_KEY, items)
        });
        if let Ok(LoadOutcome::Fresh { count }) = &outcome {
            self.loaded.store(true, Ordering::Release);
            info!(count, "Loaded courses");
        }
        outcome
    }
}
