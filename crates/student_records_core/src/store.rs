//! crates/student_records_core/src/store.rs
//!
//! The record store: the authoritative in-memory student list, kept in sync with
//! the remote student resource and mirrored into the local cache.
//!
//! # Invariants
//! - Student ids are unique within the list at all times.
//! - A failed remote write leaves the list exactly as it was.
//! - The cache is only ever written with a list that is also in memory.
//! - At most one load is in flight; at most one mutation per id is in flight.
//! - A load never overlaps a mutation: mutations share `sync_gate`, a load
//!   holds it exclusively from fetch to settle.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::{Student, StudentDraft, StudentId};
use crate::error::{StoreError, StoreResult};
use crate::ports::{LocalCache, PortError, StudentResource};
use crate::validation::{sanitize, validate};

pub const STUDENTS_CACHE_KEY: &str = "students";

//=========================================================================================
// Observable State
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    #[default]
    Idle,
    Loading,
    /// No usable data: the remote failed and there was nothing cached.
    Error,
}

/// A read-only copy of a collection's state handed to views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub status: StoreStatus,
    /// The most recent failure, until cleared or superseded by a successful load.
    pub error: Option<String>,
    /// The items come from the cache because the last load failed.
    pub stale: bool,
}

pub type StoreSnapshot = Snapshot<Student>;

/// How a load finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fresh data from the remote resource.
    Fresh { count: usize },
    /// The remote failed; last-known-good data is being served.
    Cached { count: usize },
    /// Another load was already running; this call waited for it instead.
    Coalesced,
}

#[derive(Debug)]
pub(crate) struct CollectionState<T> {
    pub(crate) items: Vec<T>,
    pub(crate) status: StoreStatus,
    pub(crate) error: Option<String>,
    pub(crate) stale: bool,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: StoreStatus::Idle,
            error: None,
            stale: false,
        }
    }
}

impl<T: Clone> CollectionState<T> {
    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            items: self.items.clone(),
            status: self.status,
            error: self.error.clone(),
            stale: self.stale,
        }
    }

    /// Records `err` as the current error and hands it back for returning.
    pub(crate) fn fail(&mut self, err: StoreError) -> StoreError {
        self.error = Some(err.to_string());
        err
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
        if self.status == StoreStatus::Error {
            self.status = StoreStatus::Idle;
        }
    }

    /// Applies the result of a remote fetch, falling back to `cached` (or to
    /// what is already in memory) when the fetch failed.
    pub(crate) fn settle_load(
        &mut self,
        fetched: Result<Vec<T>, PortError>,
        cached: Option<Vec<T>>,
        write_back: impl FnOnce(&[T]) -> StoreResult<()>,
    ) -> StoreResult<LoadOutcome> {
        match fetched {
            Ok(items) => {
                let count = items.len();
                self.items = items;
                self.status = StoreStatus::Idle;
                self.stale = false;
                self.error = write_back(&self.items).err().map(|e| e.to_string());
                Ok(LoadOutcome::Fresh { count })
            }
            Err(port_err) => {
                let err = StoreError::remote(port_err);
                if let Some(items) = cached.filter(|c| !c.is_empty()) {
                    self.items = items;
                }
                if self.items.is_empty() {
                    self.status = StoreStatus::Error;
                    self.stale = false;
                    return Err(self.fail(err));
                }
                self.status = StoreStatus::Idle;
                self.stale = true;
                self.error = Some(err.to_string());
                Ok(LoadOutcome::Cached {
                    count: self.items.len(),
                })
            }
        }
    }
}

//=========================================================================================
// Cache Helpers
//=========================================================================================

pub(crate) fn read_cached<T: DeserializeOwned>(
    cache: &dyn LocalCache,
    key: &str,
) -> StoreResult<Option<Vec<T>>> {
    match cache.read(key).map_err(StoreError::cache)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::cache(format!("cached `{key}` is corrupt: {e}"))),
        None => Ok(None),
    }
}

pub(crate) fn write_cached<T: Serialize>(
    cache: &dyn LocalCache,
    key: &str,
    items: &[T],
) -> StoreResult<()> {
    let raw = serde_json::to_string(items).map_err(StoreError::cache)?;
    cache.write(key, &raw).map_err(StoreError::cache)
}

/// Drops later duplicates so the id-uniqueness invariant holds for external data.
fn dedupe_by_id(students: Vec<Student>) -> Vec<Student> {
    let mut seen = HashSet::new();
    let before = students.len();
    let unique: Vec<Student> = students
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .collect();
    if unique.len() != before {
        warn!(
            dropped = before - unique.len(),
            "Dropped student records with duplicate ids"
        );
    }
    unique
}

//=========================================================================================
// Pending-Mutation Tracking
//=========================================================================================

/// Releases the claim on an id when the mutation finishes, however it finishes.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<StudentId>>,
    id: StudentId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.id);
    }
}

//=========================================================================================
// RecordStore
//=========================================================================================

/// The single source of truth for student records.
///
/// Construct one per application and share it (e.g. behind an `Arc`) with every view.
pub struct RecordStore {
    resource: Arc<dyn StudentResource>,
    cache: Arc<dyn LocalCache>,
    state: RwLock<CollectionState<Student>>,
    load_gate: tokio::sync::Mutex<()>,
    sync_gate: tokio::sync::RwLock<()>,
    pending: Mutex<HashSet<StudentId>>,
}

impl RecordStore {
    pub fn new(resource: Arc<dyn StudentResource>, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            resource,
            cache,
            state: RwLock::new(CollectionState::default()),
            load_gate: tokio::sync::Mutex::new(()),
            sync_gate: tokio::sync::RwLock::new(()),
            pending: Mutex::new(HashSet::new()),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().snapshot()
    }

    /// Just the records, for callers that do not care about status.
    pub fn students(&self) -> Vec<Student> {
        self.state.read().items.clone()
    }

    /// Seeds the in-memory list from the local cache. Called once at startup.
    ///
    /// An unreadable cache is recorded in the error state; the store then
    /// continues memory-only.
    pub fn hydrate(&self) -> StoreResult<usize> {
        let mut state = self.state.write();
        match read_cached::<Student>(self.cache.as_ref(), STUDENTS_CACHE_KEY) {
            Ok(Some(cached)) => {
                state.items = dedupe_by_id(cached);
                info!(count = state.items.len(), "Hydrated students from local cache");
                Ok(state.items.len())
            }
            Ok(None) => {
                debug!("No cached students found");
                Ok(0)
            }
            Err(err) => {
                warn!(error = %err, "Could not read cached students; continuing memory-only");
                Err(state.fail(err))
            }
        }
    }

    /// Fetches the full list from the remote resource.
    ///
    /// On failure the last-known-good data stays in place (from the cache, or
    /// what is already in memory) and only an empty result is fatal.
    pub async fn load(&self) -> StoreResult<LoadOutcome> {
        let _gate = match self.load_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => {
                debug!("Student load already in flight; waiting for it");
                let _wait = self.load_gate.lock().await;
                return Ok(LoadOutcome::Coalesced);
            }
        };

        {
            let mut state = self.state.write();
            state.status = StoreStatus::Loading;
            state.error = None;
        }
        // Waits for in-flight mutations and holds off new ones until settled.
        let _exclusive = self.sync_gate.write().await;

        let fetched = self.resource.list_students().await.map(dedupe_by_id);
        if let Err(e) = &fetched {
            error!(error = %e, "Failed to load students from remote resource");
        }
        let cached = match &fetched {
            Ok(_) => None,
            Err(_) => self.cached_fallback(),
        };

        let cache = self.cache.as_ref();
        let outcome = self.state.write().settle_load(fetched, cached, |items| {
            write_cached(cache, STUDENTS_CACHE_KEY, items)
        });
        match &outcome {
            Ok(LoadOutcome::Fresh { count }) => info!(count, "Loaded students"),
            Ok(LoadOutcome::Cached { count }) => {
                warn!(count, "Serving cached students after failed load")
            }
            _ => {}
        }
        outcome
    }

    fn cached_fallback(&self) -> Option<Vec<Student>> {
        match read_cached::<Student>(self.cache.as_ref(), STUDENTS_CACHE_KEY) {
            Ok(cached) => cached.map(dedupe_by_id),
            Err(err) => {
                warn!(error = %err, "Cache fallback unavailable");
                None
            }
        }
    }

    /// Validates, persists remotely, then appends.
    ///
    /// `id` and `createdAt` are assigned here when the candidate lacks them; a
    /// remote that assigns its own id wins.
    pub async fn add(&self, candidate: StudentDraft) -> StoreResult<Student> {
        let errors = validate(&candidate);
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }
        let clean = sanitize(&candidate);

        let _shared = self.sync_gate.read().await;
        let id = clean.id.clone().unwrap_or_else(StudentId::generate);
        if self.contains(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        let _pending = self.claim(&id)?;

        let provisional = Student {
            id,
            name: clean.name,
            email: clean.email,
            course: clean.course,
            profile_image: clean.profile_image.unwrap_or_default(),
            created_at: Some(clean.created_at.unwrap_or_else(Utc::now)),
            updated_at: None,
        };

        let created = match self.resource.create_student(&provisional).await {
            Ok(created) => created,
            Err(e) => {
                error!(error = %e, "Failed to add student");
                return Err(self.state.write().fail(StoreError::remote(e)));
            }
        };

        let mut state = self.state.write();
        if state.items.iter().any(|s| s.id == created.id) {
            return Err(state.fail(StoreError::Remote(format!(
                "remote assigned id {} which is already in use",
                created.id
            ))));
        }
        state.items.push(created.clone());
        self.persist(&mut state);
        info!(id = %created.id, "Added student");
        Ok(created)
    }

    /// Replaces the record with `record.id` wholesale.
    ///
    /// `createdAt` is kept from the stored record; `updatedAt` is set to now.
    pub async fn update(&self, record: Student) -> StoreResult<Student> {
        let _shared = self.sync_gate.read().await;
        let existing = self
            .find(&record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;

        let draft = StudentDraft::from(&record);
        let errors = validate(&draft);
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }
        let clean = sanitize(&draft);
        let _pending = self.claim(&record.id)?;

        let next = Student {
            id: record.id,
            name: clean.name,
            email: clean.email,
            course: clean.course,
            profile_image: clean.profile_image.unwrap_or_default(),
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
        };

        if let Err(e) = self.resource.replace_student(&next).await {
            error!(id = %next.id, error = %e, "Failed to update student");
            return Err(self.state.write().fail(StoreError::remote(e)));
        }

        let mut state = self.state.write();
        let Some(slot) = state.items.iter_mut().find(|s| s.id == next.id) else {
            return Err(StoreError::NotFound(next.id));
        };
        *slot = next.clone();
        self.persist(&mut state);
        info!(id = %next.id, "Updated student");
        Ok(next)
    }

    /// Deletes remotely, then drops the record from memory and cache.
    pub async fn remove(&self, id: &StudentId) -> StoreResult<()> {
        let _shared = self.sync_gate.read().await;
        if !self.contains(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        let _pending = self.claim(id)?;

        if let Err(e) = self.resource.delete_student(id).await {
            error!(%id, error = %e, "Failed to delete student");
            return Err(self.state.write().fail(StoreError::remote(e)));
        }

        let mut state = self.state.write();
        state.items.retain(|s| &s.id != id);
        self.persist(&mut state);
        info!(%id, "Removed student");
        Ok(())
    }

    /// Resets the error state; the data is left alone.
    pub fn clear_error(&self) {
        self.state.write().clear_error();
    }

    fn find(&self, id: &StudentId) -> Option<Student> {
        self.state.read().items.iter().find(|s| &s.id == id).cloned()
    }

    fn contains(&self, id: &StudentId) -> bool {
        self.state.read().items.iter().any(|s| &s.id == id)
    }

    fn claim(&self, id: &StudentId) -> StoreResult<PendingGuard<'_>> {
        if !self.pending.lock().insert(id.clone()) {
            return Err(StoreError::Busy(id.clone()));
        }
        Ok(PendingGuard {
            pending: &self.pending,
            id: id.clone(),
        })
    }

    /// Mirrors the list into the cache. A failure is recorded, never rolled back.
    fn persist(&self, state: &mut CollectionState<Student>) {
        if let Err(err) = write_cached(self.cache.as_ref(), STUDENTS_CACHE_KEY, &state.items) {
            warn!(error = %err, "Failed to write students to local cache");
            state.fail(err);
        }
    }
}
