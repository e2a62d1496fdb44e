use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use common::types::Message;
use models::enrollment;
use service::errors::{DirectoryError, Field};

use super::AppState;
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct EnrollRequest {
    pub course_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct EnrollmentResponse {
    pub enrollment_id: i32,
    pub student_id: i32,
    pub course_id: i32,
}

impl From<enrollment::Model> for EnrollmentResponse {
    fn from(m: enrollment::Model) -> Self {
        Self { enrollment_id: m.id, student_id: m.student_id, course_id: m.course_id }
    }
}

#[utoipa::path(
    get, path = "/student/{id}/course", tag = "enrollment",
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Enrollments ordered by id, possibly empty", body = [EnrollmentResponse]),
        (status = 404, description = "ENROLLMENT002", body = crate::errors::ErrorBody)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    WithRejection(Path(student_id), _): WithRejection<Path<i32>, JsonApiError>,
) -> Result<Json<Vec<EnrollmentResponse>>, JsonApiError> {
    let rows = state.directory.list_enrollments_for_student(student_id).await?;
    Ok(Json(rows.into_iter().map(EnrollmentResponse::from).collect()))
}

#[utoipa::path(
    post, path = "/student/{id}/course", tag = "enrollment",
    params(("id" = i32, Path, description = "Student id")),
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 400, description = "ENROLLMENT005 / REQUEST001", body = crate::errors::ErrorBody),
        (status = 404, description = "ENROLLMENT001 / ENROLLMENT002", body = crate::errors::ErrorBody),
        (status = 409, description = "ENROLLMENT003", body = crate::errors::ErrorBody)
    )
)]
pub async fn enroll(
    State(state): State<AppState>,
    WithRejection(Path(student_id), _): WithRejection<Path<i32>, JsonApiError>,
    WithRejection(Json(input), _): WithRejection<Json<EnrollRequest>, JsonApiError>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), JsonApiError> {
    let course_id = input.course_id.ok_or(DirectoryError::MissingField(Field::CourseId))?;
    let created = state.directory.enroll(student_id, course_id).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    delete, path = "/student/{id}/course/{course_id}", tag = "enrollment",
    params(
        ("id" = i32, Path, description = "Student id"),
        ("course_id" = i32, Path, description = "Course id")
    ),
    responses(
        (status = 200, description = "Successfully Deleted"),
        (status = 404, description = "ENROLLMENT001 / ENROLLMENT002 / ENROLLMENT004", body = crate::errors::ErrorBody)
    )
)]
pub async fn unenroll(
    State(state): State<AppState>,
    WithRejection(Path((student_id, course_id)), _): WithRejection<Path<(i32, i32)>, JsonApiError>,
) -> Result<Json<Message>, JsonApiError> {
    state.directory.unenroll(student_id, course_id).await?;
    Ok(Json(Message::deleted()))
}
