//! services/dashboard/src/web/protocol.rs
//!
//! Defines the JSON request and response bodies exchanged between the browser
//! dashboard and this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use student_records_core::views::ParseViewError;
use student_records_core::{
    Course, LoadOutcome, SortKey, SortOrder, Student, StudentDraft, StudentId, StoreStatus,
    ValidationErrors, ViewQuery,
};
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Query Strings
//=========================================================================================

/// Filter and sort parameters of the list view.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring of the name or email.
    pub search: Option<String>,
    /// Exact course name.
    pub course: Option<String>,
    /// `name`, `email`, `course` or `createdAt`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
}

impl ListQuery {
    pub fn to_view_query(&self) -> Result<ViewQuery, ParseViewError> {
        view_query(
            self.search.as_deref(),
            self.course.as_deref(),
            self.sort_by.as_deref(),
            self.sort_order.as_deref(),
        )
    }
}

/// Export parameters; the filter fields select the same list the user sees.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `csv` (default) or `json`.
    pub format: Option<String>,
    /// Comma-separated field keys; defaults to `name,email,course,createdAt`.
    pub fields: Option<String>,
    pub search: Option<String>,
    pub course: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ExportQuery {
    pub fn to_view_query(&self) -> Result<ViewQuery, ParseViewError> {
        view_query(
            self.search.as_deref(),
            self.course.as_deref(),
            self.sort_by.as_deref(),
            self.sort_order.as_deref(),
        )
    }
}

fn view_query(
    search: Option<&str>,
    course: Option<&str>,
    sort_by: Option<&str>,
    sort_order: Option<&str>,
) -> Result<ViewQuery, ParseViewError> {
    Ok(ViewQuery {
        search_term: search.unwrap_or_default().to_string(),
        selected_course: course.unwrap_or_default().to_string(),
        sort_by: sort_by.map(SortKey::from_str).transpose()?.unwrap_or_default(),
        sort_order: sort_order
            .map(SortOrder::from_str)
            .transpose()?
            .unwrap_or_default(),
    })
}

//=========================================================================================
// Request Payloads
//=========================================================================================

/// The form submitted when adding or editing a student.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentPayload {
    /// Ignored on update; the path id wins.
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub course: String,
    pub profile_image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl StudentPayload {
    pub fn into_draft(self) -> StudentDraft {
        StudentDraft {
            id: self.id.map(StudentId::new),
            name: self.name,
            email: self.email,
            course: self.course,
            profile_image: self.profile_image,
            created_at: self.created_at,
        }
    }

    /// The full replacement record for `id`. Timestamps are owned by the store.
    pub fn into_record(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            course: self.course,
            profile_image: self.profile_image.unwrap_or_default(),
            created_at: None,
            updated_at: None,
        }
    }
}

//=========================================================================================
// Response Bodies
//=========================================================================================

/// A student as rendered by the dashboard, with its resolved avatar.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub course: String,
    pub profile_image: String,
    pub avatar_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Student> for StudentView {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.to_string(),
            name: student.name.clone(),
            email: student.email.clone(),
            course: student.course.clone(),
            profile_image: student.profile_image.clone(),
            avatar_url: student.avatar_url(),
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

/// The visible page of the list view plus the store's status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentListResponse {
    pub students: Vec<StudentView>,
    /// Records in the store before filtering.
    pub total: usize,
    #[schema(value_type = String, example = "idle")]
    pub status: StoreStatus,
    pub error: Option<String>,
    pub stale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration: String,
}

impl From<&Course> for CourseView {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.to_string(),
            name: course.name.clone(),
            description: course.description.clone(),
            duration: course.duration.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseListResponse {
    pub courses: Vec<CourseView>,
    #[schema(value_type = String, example = "idle")]
    pub status: StoreStatus,
    pub error: Option<String>,
    pub stale: bool,
}

/// The result of a reload or retry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    /// `fresh`, `cached` or `coalesced`.
    pub outcome: String,
    pub count: Option<usize>,
    /// The remote failure when cached data is being served.
    pub error: Option<String>,
}

impl LoadResponse {
    pub fn new(outcome: LoadOutcome, error: Option<String>) -> Self {
        let (name, count) = match outcome {
            LoadOutcome::Fresh { count } => ("fresh", Some(count)),
            LoadOutcome::Cached { count } => ("cached", Some(count)),
            LoadOutcome::Coalesced => ("coalesced", None),
        };
        Self {
            outcome: name.to_string(),
            count,
            error,
        }
    }
}

/// The body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Per-field messages when a submitted form failed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }

    pub fn invalid(errors: &ValidationErrors) -> Self {
        Self {
            error: "Validation failed".to_string(),
            fields: Some(
                errors
                    .iter()
                    .map(|(field, msg)| (field.as_str().to_string(), msg.to_string()))
                    .collect(),
            ),
        }
    }
}
