pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the API routes. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/students",
            get(rest::list_students_handler).post(rest::add_student_handler),
        )
        .route("/students/reload", post(rest::reload_students_handler))
        .route(
            "/students/{id}",
            put(rest::update_student_handler).delete(rest::remove_student_handler),
        )
        .route("/store/error", delete(rest::clear_error_handler))
        .route("/courses", get(rest::list_courses_handler))
        .route("/courses/retry", post(rest::retry_courses_handler))
        .route("/analytics", get(rest::analytics_handler))
        .route("/stats", get(rest::stats_handler))
        .route("/export", get(rest::export_handler))
        .with_state(app_state)
}
