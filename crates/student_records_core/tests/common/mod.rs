//! Shared in-memory fakes for store integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use student_records_core::{
    Course, CourseResource, LocalCache, PortError, PortResult, Student, StudentDraft, StudentId,
    StudentResource,
};

/// A remote student collection held in memory.
#[derive(Default)]
pub struct FakeStudents {
    pub remote: Mutex<Vec<Student>>,
    pub fail: AtomicBool,
    /// When set, `create_student` replaces the client id with `srv-<n>`.
    pub assign_ids: AtomicBool,
    pub list_calls: AtomicUsize,
    /// Artificial latency so concurrent calls overlap.
    pub delay_ms: AtomicUsize,
    /// Extra latency on list calls only, after the data has been read.
    pub list_lag_ms: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeStudents {
    pub fn with(students: Vec<Student>) -> Self {
        let fake = Self::default();
        *fake.remote.lock() = students;
        fake
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    async fn step(&self) -> PortResult<()> {
        let delay = self.delay_ms.load(Ordering::SeqCst) as u64;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StudentResource for FakeStudents {
    async fn list_students(&self) -> PortResult<Vec<Student>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("connection refused".to_string()));
        }
        // Read first and answer late, like a slow response to an early request.
        let listed = self.remote.lock().clone();
        let lag = self.delay_ms.load(Ordering::SeqCst) + self.list_lag_ms.load(Ordering::SeqCst);
        if lag > 0 {
            tokio::time::sleep(Duration::from_millis(lag as u64)).await;
        }
        Ok(listed)
    }

    async fn create_student(&self, student: &Student) -> PortResult<Student> {
        self.step().await?;
        let mut created = student.clone();
        if self.assign_ids.load(Ordering::SeqCst) {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            created.id = StudentId::new(format!("srv-{n}"));
        }
        self.remote.lock().push(created.clone());
        Ok(created)
    }

    async fn replace_student(&self, student: &Student) -> PortResult<()> {
        self.step().await?;
        let mut remote = self.remote.lock();
        match remote.iter_mut().find(|s| s.id == student.id) {
            Some(slot) => {
                *slot = student.clone();
                Ok(())
            }
            None => Err(PortError::NotFound(format!("Student {} not found", student.id))),
        }
    }

    async fn delete_student(&self, id: &StudentId) -> PortResult<()> {
        self.step().await?;
        self.remote.lock().retain(|s| &s.id != id);
        Ok(())
    }
}

/// A remote course collection held in memory.
#[derive(Default)]
pub struct FakeCourses {
    pub courses: Mutex<Vec<Course>>,
    pub fail: AtomicBool,
    pub list_calls: AtomicUsize,
}

impl FakeCourses {
    pub fn with(courses: Vec<Course>) -> Self {
        let fake = Self::default();
        *fake.courses.lock() = courses;
        fake
    }
}

#[async_trait]
impl CourseResource for FakeCourses {
    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("Failed to fetch courses".to_string()));
        }
        Ok(self.courses.lock().clone())
    }
}

/// A cache whose storage is gone: reads and writes both fail.
pub struct BrokenCache;

impl LocalCache for BrokenCache {
    fn read(&self, _key: &str) -> PortResult<Option<String>> {
        Err(PortError::Unavailable("storage quota exceeded".to_string()))
    }

    fn write(&self, _key: &str, _value: &str) -> PortResult<()> {
        Err(PortError::Unavailable("storage quota exceeded".to_string()))
    }
}

pub fn student(id: &str, name: &str, course: &str) -> Student {
    Student {
        id: StudentId::new(id),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        course: course.to_string(),
        profile_image: String::new(),
        created_at: None,
        updated_at: None,
    }
}

pub fn draft(name: &str, email: &str, course: &str) -> StudentDraft {
    StudentDraft::new(name, email, course)
}
