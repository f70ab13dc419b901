//! crates/student_records_core/src/views.rs
//!
//! The filtered and sorted projection of the student list shown by the dashboard.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::Student;

/// The field the list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    Email,
    Course,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseViewError {
    kind: &'static str,
    value: String,
}

impl FromStr for SortKey {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "email" => Ok(SortKey::Email),
            "course" => Ok(SortKey::Course),
            "createdAt" => Ok(SortKey::CreatedAt),
            other => Err(ParseViewError {
                kind: "sort key",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ParseViewError {
                kind: "sort order",
                value: other.to_string(),
            }),
        }
    }
}

/// UI parameters of the list view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewQuery {
    pub search_term: String,
    /// Exact course name; empty means no course filter.
    pub selected_course: String,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl ViewQuery {
    /// A record passes when it matches the search term (name or email,
    /// case-insensitive substring) and the selected course (exact).
    pub fn matches(&self, student: &Student) -> bool {
        let needle = self.search_term.to_lowercase();
        let matches_search = needle.is_empty()
            || student.name.to_lowercase().contains(&needle)
            || student.email.to_lowercase().contains(&needle);
        let matches_course =
            self.selected_course.is_empty() || student.course == self.selected_course;
        matches_search && matches_course
    }
}

/// Compares two records by `key`, strings case-insensitively.
fn compare_by(key: SortKey, a: &Student, b: &Student) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
        SortKey::Course => a.course.to_lowercase().cmp(&b.course.to_lowercase()),
        // `None` (no timestamp on record) orders first.
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Filters and sorts `students` into a new list; the input is left untouched.
///
/// The sort is stable, and `desc` reverses the comparator rather than the
/// result, so records with equal keys keep their input order either way.
pub fn project(students: &[Student], query: &ViewQuery) -> Vec<Student> {
    let mut visible: Vec<Student> = students
        .iter()
        .filter(|s| query.matches(s))
        .cloned()
        .collect();

    let key = query.sort_by;
    match query.sort_order {
        SortOrder::Asc => visible.sort_by(|a, b| compare_by(key, a, b)),
        SortOrder::Desc => visible.sort_by(|a, b| compare_by(key, b, a)),
    }
    visible
}
