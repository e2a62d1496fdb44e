use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use service::DirectoryError;
use tracing::error;

/// Wire body of every failed request.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error_code: String,
    pub error_message: String,
}

#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error_code: &'static str,
    pub error_message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error_code: &'static str, error_message: impl Into<String>) -> Self {
        Self { status, error_code, error_message: error_message.into() }
    }

    pub fn bad_request(error_message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "REQUEST001", error_message)
    }
}

fn status_for(e: &DirectoryError) -> StatusCode {
    match e {
        DirectoryError::MissingField(_) => StatusCode::BAD_REQUEST,
        DirectoryError::DuplicateRollNumber(_)
        | DirectoryError::DuplicateCourseCode(_)
        | DirectoryError::AlreadyEnrolled { .. }
        | DirectoryError::CourseInUse { .. } => StatusCode::CONFLICT,
        DirectoryError::NotFound { .. }
        | DirectoryError::StudentNotFound(_)
        | DirectoryError::CourseNotFound(_)
        | DirectoryError::EnrollmentNotFound { .. } => StatusCode::NOT_FOUND,
        DirectoryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DirectoryError> for JsonApiError {
    fn from(e: DirectoryError) -> Self {
        let status = status_for(&e);
        if let DirectoryError::Storage(detail) = &e {
            error!(error_code = e.code(), %detail, "request failed in storage");
            return Self::new(status, e.code(), "Internal server error");
        }
        Self::new(status, e.code(), e.to_string())
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error_code: self.error_code.to_string(), error_message: self.error_message };
        (self.status, Json(body)).into_response()
    }
}
