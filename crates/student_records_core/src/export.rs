//! crates/student_records_core/src/export.rs
//!
//! CSV and JSON export of a student list for a caller-selected set of fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::domain::Student;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Please select at least one field to export")]
    NoFields,
    #[error("Unknown export field '{0}'")]
    UnknownField(String),
    #[error("Unknown export format '{0}'")]
    UnknownFormat(String),
    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportField {
    Id,
    Name,
    Email,
    Course,
    CreatedAt,
    UpdatedAt,
    ProfileImage,
}

impl ExportField {
    /// The fields pre-selected in the export dialog.
    pub const DEFAULT: [ExportField; 4] = [
        ExportField::Name,
        ExportField::Email,
        ExportField::Course,
        ExportField::CreatedAt,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ExportField::Id => "id",
            ExportField::Name => "name",
            ExportField::Email => "email",
            ExportField::Course => "course",
            ExportField::CreatedAt => "createdAt",
            ExportField::UpdatedAt => "updatedAt",
            ExportField::ProfileImage => "profileImage",
        }
    }

    /// The field's value as text; absent timestamps become empty strings.
    fn text(self, student: &Student) -> String {
        match self {
            ExportField::Id => student.id.to_string(),
            ExportField::Name => student.name.clone(),
            ExportField::Email => student.email.clone(),
            ExportField::Course => student.course.clone(),
            ExportField::CreatedAt => student
                .created_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            ExportField::UpdatedAt => student
                .updated_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            ExportField::ProfileImage => student.profile_image.clone(),
        }
    }

    fn json(self, student: &Student) -> Value {
        match self {
            ExportField::CreatedAt if student.created_at.is_none() => Value::Null,
            ExportField::UpdatedAt if student.updated_at.is_none() => Value::Null,
            other => Value::String(other.text(student)),
        }
    }
}

impl FromStr for ExportField {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(ExportField::Id),
            "name" => Ok(ExportField::Name),
            "email" => Ok(ExportField::Email),
            "course" => Ok(ExportField::Course),
            "createdAt" => Ok(ExportField::CreatedAt),
            "updatedAt" => Ok(ExportField::UpdatedAt),
            "profileImage" => Ok(ExportField::ProfileImage),
            other => Err(ExportError::UnknownField(other.to_string())),
        }
    }
}

/// Parses a comma-separated field list such as `name,email,createdAt`.
pub fn parse_fields(list: &str) -> Result<Vec<ExportField>, ExportError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ExportField::from_str)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Quotes a CSV cell when it contains a delimiter, quote or line break.
fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(students: &[Student], fields: &[ExportField]) -> Result<String, ExportError> {
    if fields.is_empty() {
        return Err(ExportError::NoFields);
    }

    let header = fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(",");
    let rows = students.iter().map(|student| {
        fields
            .iter()
            .map(|f| escape_csv(&f.text(student)))
            .collect::<Vec<_>>()
            .join(",")
    });

    Ok(std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Pretty-printed JSON array; each object's keys follow `fields` order.
pub fn to_json(students: &[Student], fields: &[ExportField]) -> Result<String, ExportError> {
    if fields.is_empty() {
        return Err(ExportError::NoFields);
    }

    let rows: Vec<Value> = students
        .iter()
        .map(|student| {
            let object: Map<String, Value> = fields
                .iter()
                .map(|f| (f.key().to_string(), f.json(student)))
                .collect();
            Value::Object(object)
        })
        .collect();

    Ok(serde_json::to_string_pretty(&rows)?)
}

pub fn export(
    students: &[Student],
    fields: &[ExportField],
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => to_csv(students, fields),
        ExportFormat::Json => to_json(students, fields),
    }
}

/// `students_export_<date>.<ext>`
pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "students_export_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}
