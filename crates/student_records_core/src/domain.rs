//! crates/student_records_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! Wire names are camelCase so the same shapes round-trip through the remote
//! resource and the local cache unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Base URL of the generated avatar used when a student has no profile image.
const AVATAR_PLACEHOLDER_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

//=========================================================================================
// Identifiers
//=========================================================================================

/// Opaque, stable identifier of a record.
///
/// Remote mock APIs hand out string ids while older cached data used numeric
/// ids, so both JSON forms are accepted and normalised to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

pub type StudentId = RecordId;
pub type CourseId = RecordId;

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh client-side id for records the remote has not seen yet.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

//=========================================================================================
// Student
//=========================================================================================

/// A student record as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub course: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    /// The profile image, or a deterministic placeholder seeded by the name.
    pub fn avatar_url(&self) -> String {
        if self.profile_image.trim().is_empty() {
            format!(
                "{}{}",
                AVATAR_PLACEHOLDER_BASE,
                urlencoding::encode(&self.name)
            )
        } else {
            self.profile_image.clone()
        }
    }

    /// The part of the email after `@`, if there is one.
    pub fn email_domain(&self) -> Option<&str> {
        self.email.split('@').nth(1)
    }
}

/// A candidate record submitted for add or update.
///
/// Everything the store assigns itself (`id`, `createdAt`) is optional here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    #[serde(default)]
    pub id: Option<StudentId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl StudentDraft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        course: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            course: course.into(),
            ..Self::default()
        }
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            id: Some(student.id.clone()),
            name: student.name.clone(),
            email: student.email.clone(),
            course: student.course.clone(),
            profile_image: Some(student.profile_image.clone()),
            created_at: student.created_at,
        }
    }
}

//=========================================================================================
// Course
//=========================================================================================

/// Read-only course reference data, sourced from the remote course resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CourseId::new(id),
            name: name.into(),
            description: String::new(),
            duration: String::new(),
        }
    }
}
