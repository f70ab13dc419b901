//! crates/student_records_core/src/validation.rs
//!
//! Field validation and sanitization for student candidates.
//!
//! `validate` is the single authority used by both the store's write path and
//! any interactive form, so its output depends on nothing but its input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::StudentDraft;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;

// local@domain.tld: no whitespace, exactly one `@`, and at least one
// character on each side of the final dot.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("email pattern is a valid regex")
});

/// A candidate field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Course,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Course => "course",
        }
    }
}

/// Field-level validation failures. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// Checks `name`, `email` and `course` of a candidate.
pub fn validate(candidate: &StudentDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    let name = candidate.name.trim();
    if name.is_empty() {
        errors.insert(Field::Name, "Name is required");
    } else if !is_valid_name(name) {
        errors.insert(Field::Name, "Name must be between 2 and 50 characters");
    }

    if candidate.email.trim().is_empty() {
        errors.insert(Field::Email, "Email is required");
    } else if !is_valid_email(&candidate.email) {
        errors.insert(Field::Email, "Please enter a valid email address");
    }

    if candidate.course.trim().is_empty() {
        errors.insert(Field::Course, "Please select a course");
    }

    errors
}

pub fn is_valid(candidate: &StudentDraft) -> bool {
    validate(candidate).is_empty()
}

fn is_valid_name(trimmed: &str) -> bool {
    let len = trimmed.chars().count();
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Normalises a candidate before persistence.
///
/// Trims the text fields, lower-cases the email and turns a missing profile
/// image into an empty string. Idempotent.
pub fn sanitize(candidate: &StudentDraft) -> StudentDraft {
    StudentDraft {
        id: candidate.id.clone(),
        name: candidate.name.trim().to_string(),
        email: candidate.email.trim().to_lowercase(),
        course: candidate.course.trim().to_string(),
        profile_image: Some(
            candidate
                .profile_image
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        ),
        created_at: candidate.created_at,
    }
}
