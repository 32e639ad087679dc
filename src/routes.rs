use crate::{
    data::student::StudentId,
    error::{MissingStudentSnafu, StudentsResult},
    routes::{
        api::{delete_student, get_student, get_students, post_add_student, put_student},
        dashboard::{
            get_dashboard, internal_delete_pending, internal_get_cancel_edit,
            internal_get_delete_student, internal_get_edit_student, internal_get_students_table,
            internal_post_cancel_pending, internal_put_student,
        },
        index::get_index_route,
        student_form::{
            get_student_details, internal_get_new_student_form, internal_post_new_student,
        },
    },
    state::StudentsState,
};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use maud::Markup;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod dashboard;
pub mod index;
pub mod student_form;

/// HTMX event fired whenever the dashboard cache changed under the table.
pub const STUDENTS_CHANGED: &str = "students-changed";

pub fn router(state: StudentsState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(get_index_route))
        .route("/addstudents", post(post_add_student))
        .route("/students", get(get_students))
        .route(
            "/students/{id}",
            get(get_student).put(put_student).delete(delete_student),
        )
        .route("/studentdetails", get(get_student_details))
        .route("/dashboard", get(get_dashboard))
        .route("/internal/new_student", post(internal_post_new_student))
        .route(
            "/internal/new_student_form",
            get(internal_get_new_student_form),
        )
        .route("/internal/students_table", get(internal_get_students_table))
        .route("/internal/students/{id}", put(internal_put_student))
        .route("/internal/students/{id}/edit", get(internal_get_edit_student))
        .route(
            "/internal/students/{id}/cancel_edit",
            get(internal_get_cancel_edit),
        )
        .route(
            "/internal/students/{id}/delete",
            get(internal_get_delete_student),
        )
        .route(
            "/internal/students/{id}/pending_delete",
            post(internal_post_cancel_pending).delete(internal_delete_pending),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Tells any mounted table to re-render itself from its cache after this response.
pub fn students_changed(markup: Markup) -> Response {
    ([("HX-Trigger", STUDENTS_CHANGED)], markup).into_response()
}

/// Anything that doesn't parse as an id was never assigned one.
pub fn parse_id(raw: &str) -> StudentsResult<StudentId> {
    raw.parse()
        .ok()
        .ok_or_else(|| MissingStudentSnafu { id: raw }.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_ids_are_missing_students() {
        assert!(parse_id("65a1f0c2e4b0a1b2c3d4e5f6").unwrap_err().is_not_found());

        let id = StudentId::new_random();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
