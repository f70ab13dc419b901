//! services/dashboard/src/adapters/http.rs
//!
//! This module contains the HTTP adapters for the remote student and course
//! collections. They implement the `StudentResource` and `CourseResource`
//! ports from the `core` crate using `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use student_records_core::ports::{CourseResource, PortError, PortResult, StudentResource};
use student_records_core::{Course, Student, StudentId};
use tracing::debug;

//=========================================================================================
// Shared Request Helpers
//=========================================================================================

/// Turns a non-2xx response into a `PortError` carrying the status and body.
async fn ensure_success(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = format!("HTTP {}: {}", status, body.trim());
    Err(match status {
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        _ => PortError::Unexpected(message),
    })
}

fn transport_error(err: reqwest::Error) -> PortError {
    PortError::Unexpected(err.to_string())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Unexpected(format!("Invalid response body: {}", e)))
}

//=========================================================================================
// Student Collection Adapter
//=========================================================================================

/// The body sent on create: the sanitized record without its id.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewStudentBody<'a> {
    name: &'a str,
    email: &'a str,
    course: &'a str,
    profile_image: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Student> for NewStudentBody<'a> {
    fn from(student: &'a Student) -> Self {
        Self {
            name: &student.name,
            email: &student.email,
            course: &student.course,
            profile_image: &student.profile_image,
            created_at: student.created_at,
        }
    }
}

/// The create response. Remotes differ in how much they echo back, so every
/// field is optional and falls back to what was sent.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CreatedStudent {
    id: Option<StudentId>,
    name: Option<String>,
    email: Option<String>,
    course: Option<String>,
    profile_image: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl CreatedStudent {
    fn merge_into(self, sent: &Student) -> Student {
        Student {
            id: self.id.unwrap_or_else(|| sent.id.clone()),
            name: self.name.unwrap_or_else(|| sent.name.clone()),
            email: self.email.unwrap_or_else(|| sent.email.clone()),
            course: self.course.unwrap_or_else(|| sent.course.clone()),
            profile_image: self
                .profile_image
                .unwrap_or_else(|| sent.profile_image.clone()),
            created_at: self.created_at.or(sent.created_at),
            updated_at: self.updated_at.or(sent.updated_at),
        }
    }
}

/// An adapter that implements the `StudentResource` port against a REST collection.
#[derive(Clone)]
pub struct HttpStudentResource {
    client: Client,
    collection_url: Url,
}

impl HttpStudentResource {
    /// Creates a new `HttpStudentResource` for the collection at `collection_url`.
    pub fn new(client: Client, collection_url: Url) -> Self {
        Self {
            client,
            collection_url,
        }
    }

    /// `<collection>/<id>`, with the id percent-encoded as a path segment.
    fn item_url(&self, id: &StudentId) -> PortResult<Url> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                PortError::Unexpected(format!(
                    "{} cannot be used as a collection URL",
                    self.collection_url
                ))
            })?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl StudentResource for HttpStudentResource {
    async fn list_students(&self) -> PortResult<Vec<Student>> {
        let response = self
            .client
            .get(self.collection_url.clone())
            .send()
            .await
            .map_err(transport_error)?;
        let students: Vec<Student> = read_json(ensure_success(response).await?).await?;
        debug!(count = students.len(), "Fetched students");
        Ok(students)
    }

    async fn create_student(&self, student: &Student) -> PortResult<Student> {
        let response = self
            .client
            .post(self.collection_url.clone())
            .json(&NewStudentBody::from(student))
            .send()
            .await
            .map_err(transport_error)?;
        let created: CreatedStudent = read_json(ensure_success(response).await?).await?;
        Ok(created.merge_into(student))
    }

    async fn replace_student(&self, student: &Student) -> PortResult<()> {
        let response = self
            .client
            .put(self.item_url(&student.id)?)
            .json(student)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_student(&self, id: &StudentId) -> PortResult<()> {
        let response = self
            .client
            .delete(self.item_url(id)?)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

//=========================================================================================
// Course Collection Adapter
//=========================================================================================

/// An adapter that implements the `CourseResource` port with a single `GET`.
#[derive(Clone)]
pub struct HttpCourseResource {
    client: Client,
    collection_url: Url,
}

impl HttpCourseResource {
    pub fn new(client: Client, collection_url: Url) -> Self {
        Self {
            client,
            collection_url,
        }
    }
}

#[async_trait]
impl CourseResource for HttpCourseResource {
    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let response = self
            .client
            .get(self.collection_url.clone())
            .send()
            .await
            .map_err(transport_error)?;
        read_json(ensure_success(response).await?).await
    }
}
