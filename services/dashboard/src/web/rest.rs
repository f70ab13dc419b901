//! services/dashboard/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    CourseListResponse, CourseView, ErrorBody, ExportQuery, ListQuery,
    LoadResponse, StudentListResponse, StudentPayload, StudentView,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Local;
use std::str::FromStr;
use std::sync::Arc;
use student_records_core::export::{self, parse_fields};
use student_records_core::views::project;
use student_records_core::{analytics, ExportError, ExportField, ExportFormat, StoreError, StudentId};
use tracing::{error, warn};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_students_handler,
        add_student_handler,
        update_student_handler,
        remove_student_handler,
        reload_students_handler,
        clear_error_handler,
        list_courses_handler,
        retry_courses_handler,
        analytics_handler,
        stats_handler,
        export_handler,
    ),
    components(
        schemas(
            StudentPayload,
            StudentView,
            StudentListResponse,
            CourseView,
            CourseListResponse,
            LoadResponse,
            ErrorBody
        )
    ),
    tags(
        (name = "Student Records API", description = "CRUD, analytics and export for the student dashboard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

type Failure = (StatusCode, Json<ErrorBody>);

fn store_failure(err: StoreError) -> Failure {
    let status = match &err {
        StoreError::Validation(errors) => {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody::invalid(errors)));
        }
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists(_) | StoreError::Busy(_) => StatusCode::CONFLICT,
        StoreError::Remote(_) => StatusCode::BAD_GATEWAY,
        StoreError::CacheUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ErrorBody::message(err.to_string())))
}

fn export_failure(err: ExportError) -> Failure {
    let status = match &err {
        ExportError::Serialize(_) => {
            error!("Failed to serialize export: {:?}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ErrorBody::message(err.to_string())))
}

fn bad_request(err: impl ToString) -> Failure {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::message(err.to_string())))
}

//=========================================================================================
// Student Handlers
//=========================================================================================

/// List the students visible under the given filter and sort.
#[utoipa::path(
    get,
    path = "/students",
    params(ListQuery),
    responses(
        (status = 200, description = "The filtered, sorted list", body = StudentListResponse),
        (status = 400, description = "Unknown sort key or order", body = ErrorBody)
    )
)]
pub async fn list_students_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Failure> {
    let view = query.to_view_query().map_err(bad_request)?;
    let snapshot = app_state.store.snapshot();
    let visible = project(&snapshot.items, &view);

    Ok(Json(StudentListResponse {
        students: visible.iter().map(StudentView::from).collect(),
        total: snapshot.items.len(),
        status: snapshot.status,
        error: snapshot.error,
        stale: snapshot.stale,
    }))
}

/// Add a student.
#[utoipa::path(
    post,
    path = "/students",
    request_body = StudentPayload,
    responses(
        (status = 201, description = "Student added", body = StudentView),
        (status = 409, description = "The id is already in use", body = ErrorBody),
        (status = 422, description = "The form failed validation", body = ErrorBody),
        (status = 502, description = "The remote resource rejected the change", body = ErrorBody)
    )
)]
pub async fn add_student_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<StudentPayload>,
) -> Result<impl IntoResponse, Failure> {
    match app_state.store.add(payload.into_draft()).await {
        Ok(student) => Ok((StatusCode::CREATED, Json(StudentView::from(&student)))),
        Err(e) => {
            warn!("Failed to add student: {}", e);
            Err(store_failure(e))
        }
    }
}

/// Replace a student's record.
#[utoipa::path(
    put,
    path = "/students/{id}",
    request_body = StudentPayload,
    params(
        ("id" = String, Path, description = "The id of the student to replace.")
    ),
    responses(
        (status = 200, description = "Student updated", body = StudentView),
        (status = 404, description = "No such student", body = ErrorBody),
        (status = 409, description = "Another change to this student is in progress", body = ErrorBody),
        (status = 422, description = "The form failed validation", body = ErrorBody),
        (status = 502, description = "The remote resource rejected the change", body = ErrorBody)
    )
)]
pub async fn update_student_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<StudentPayload>,
) -> Result<impl IntoResponse, Failure> {
    let record = payload.into_record(StudentId::new(id));
    match app_state.store.update(record).await {
        Ok(student) => Ok(Json(StudentView::from(&student))),
        Err(e) => {
            warn!("Failed to update student: {}", e);
            Err(store_failure(e))
        }
    }
}

/// Delete a student.
#[utoipa::path(
    delete,
    path = "/students/{id}",
    params(
        ("id" = String, Path, description = "The id of the student to delete.")
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "No such student", body = ErrorBody),
        (status = 502, description = "The remote resource rejected the change", body = ErrorBody)
    )
)]
pub async fn remove_student_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Failure> {
    match app_state.store.remove(&StudentId::new(id)).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            warn!("Failed to delete student: {}", e);
            Err(store_failure(e))
        }
    }
}

/// Reload the student list from the remote resource.
#[utoipa::path(
    post,
    path = "/students/reload",
    responses(
        (status = 200, description = "Fresh data, or cached data after a remote failure", body = LoadResponse),
        (status = 502, description = "The remote failed and nothing was cached", body = ErrorBody)
    )
)]
pub async fn reload_students_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Failure> {
    let outcome = app_state.store.load().await.map_err(store_failure)?;
    Ok(Json(LoadResponse::new(
        outcome,
        app_state.store.snapshot().error,
    )))
}

/// Dismiss the current error.
#[utoipa::path(
    delete,
    path = "/store/error",
    responses(
        (status = 204, description = "Error cleared")
    )
)]
pub async fn clear_error_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.store.clear_error();
    app_state.catalog.clear_error();
    StatusCode::NO_CONTENT
}

//=========================================================================================
// Course Handlers
//=========================================================================================

/// List the course catalog.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "The course catalog", body = CourseListResponse)
    )
)]
pub async fn list_courses_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = app_state.catalog.snapshot();
    Json(CourseListResponse {
        courses: snapshot.items.iter().map(CourseView::from).collect(),
        status: snapshot.status,
        error: snapshot.error,
        stale: snapshot.stale,
    })
}

/// Re-fetch the course catalog.
#[utoipa::path(
    post,
    path = "/courses/retry",
    responses(
        (status = 200, description = "Fresh data, or cached data after a remote failure", body = LoadResponse),
        (status = 502, description = "The remote failed and nothing was cached", body = ErrorBody)
    )
)]
pub async fn retry_courses_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Failure> {
    let outcome = app_state.catalog.retry().await.map_err(store_failure)?;
    Ok(Json(LoadResponse::new(
        outcome,
        app_state.catalog.snapshot().error,
    )))
}

//=========================================================================================
// Analytics and Export Handlers
//=========================================================================================

/// Aggregate analytics over all students.
#[utoipa::path(
    get,
    path = "/analytics",
    responses(
        (status = 200, description = "Course distribution, top email domains and registration activity")
    )
)]
pub async fn analytics_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let students = app_state.store.students();
    let courses = app_state.catalog.courses();
    Json(analytics::compute(&students, &courses, &Local::now()))
}

/// The summary cards; `filteredCount` reflects the given filter.
#[utoipa::path(
    get,
    path = "/stats",
    params(ListQuery),
    responses(
        (status = 200, description = "Dashboard summary statistics"),
        (status = 400, description = "Unknown sort key or order", body = ErrorBody)
    )
)]
pub async fn stats_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Failure> {
    let view = query.to_view_query().map_err(bad_request)?;
    let students = app_state.store.students();
    let courses = app_state.catalog.courses();
    let filtered = students.iter().filter(|s| view.matches(s)).count();
    Ok(Json(analytics::dashboard_stats(
        &students,
        &courses,
        filtered,
        &Local::now(),
    )))
}

/// Download the visible list as CSV or JSON.
#[utoipa::path(
    get,
    path = "/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "The export file", content_type = "text/csv"),
        (status = 400, description = "No fields selected, or an unknown field or format", body = ErrorBody)
    )
)]
pub async fn export_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, Failure> {
    let view = query.to_view_query().map_err(bad_request)?;
    let format = match query.format.as_deref() {
        Some(raw) => ExportFormat::from_str(raw).map_err(export_failure)?,
        None => ExportFormat::default(),
    };
    let fields = match query.fields.as_deref() {
        Some(raw) => parse_fields(raw).map_err(export_failure)?,
        None => ExportField::DEFAULT.to_vec(),
    };

    let visible = project(&app_state.store.students(), &view);
    let body = export::export(&visible, &fields, format).map_err(export_failure)?;
    let filename = export::export_filename(format, Local::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
