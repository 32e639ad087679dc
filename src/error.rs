use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type StudentsResult<T> = Result<T, StudentsError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StudentsError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse `{}` from {:?}", name, original))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
        original: String,
    },
    #[snafu(display("Invalid value {:?} for `{}`", value, name))]
    InvalidSetting { name: &'static str, value: String },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: String },
    #[snafu(display("Malformed student body"))]
    MalformedBody { source: JsonRejection },
    #[snafu(display("Error talking to the student records service"))]
    RemoteRequest { source: reqwest::Error },
    #[snafu(display("Student records service answered with {}", status))]
    RemoteStatus { status: StatusCode },
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl StudentsError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingStudent { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingStudent { .. } => StatusCode::NOT_FOUND,
            Self::MalformedBody { source } => match source {
                JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::BAD_REQUEST,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StudentsError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        // callers only ever see these three messages, everything else stays in the logs
        let message = match &self {
            Self::MissingStudent { .. } => {
                warn!(?self, "Student not found");
                "Student not found".to_string()
            }
            Self::MalformedBody { source } => {
                warn!(?self, "Malformed body");
                source.body_text()
            }
            _ => {
                error!(?self, "Error!");
                "Internal server error".to_string()
            }
        };

        (status_code, Json(MessageBody::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_students_are_404() {
        let err = StudentsError::MissingStudent { id: "nope".into() };
        assert!(err.is_not_found());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn persistence_failures_are_500() {
        let err = StudentsError::MakeQuery {
            source: sqlx::Error::PoolTimedOut,
        };
        assert!(!err.is_not_found());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err = StudentsError::RemoteStatus {
            status: StatusCode::BAD_GATEWAY,
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
