use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::info;

use common::types::Message;
use models::student;
use service::directory::domain::{NewStudent, StudentPatch};

use super::courses::CourseResponse;
use super::AppState;
use crate::errors::JsonApiError;

/// Body of `POST /student` and `PUT /student/{id}`. `course_ids` is only
/// accepted on create.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct StudentRequest {
    pub roll_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub course_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StudentResponse {
    pub student_id: i32,
    pub roll_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl From<student::Model> for StudentResponse {
    fn from(m: student::Model) -> Self {
        Self { student_id: m.id, roll_number: m.roll_number, first_name: m.first_name, last_name: m.last_name }
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StudentDetailsResponse {
    pub student: StudentResponse,
    pub courses: Vec<CourseResponse>,
}

#[utoipa::path(
    get, path = "/student", tag = "student",
    responses((status = 200, description = "All students ordered by id", body = [StudentResponse]))
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<StudentResponse>>, JsonApiError> {
    let students = state.directory.list_students().await?;
    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

#[utoipa::path(
    post, path = "/student", tag = "student",
    request_body = StudentRequest,
    responses(
        (status = 201, description = "Created", body = StudentResponse),
        (status = 400, description = "STUDENT001 / STUDENT002 / REQUEST001", body = crate::errors::ErrorBody),
        (status = 404, description = "ENROLLMENT001: a course in course_ids does not exist", body = crate::errors::ErrorBody),
        (status = 409, description = "STUDENT003", body = crate::errors::ErrorBody)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<StudentRequest>, JsonApiError>,
) -> Result<(StatusCode, Json<StudentResponse>), JsonApiError> {
    let new = NewStudent {
        roll_number: input.roll_number.unwrap_or_default(),
        first_name: input.first_name.unwrap_or_default(),
        last_name: input.last_name,
        course_ids: input.course_ids.unwrap_or_default(),
    };
    let created = state.directory.create_student(new).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get, path = "/student/{id}", tag = "student",
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "OK", body = StudentResponse),
        (status = 404, description = "STUDENT004", body = crate::errors::ErrorBody)
    )
)]
pub async fn get(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, JsonApiError>,
) -> Result<Json<StudentResponse>, JsonApiError> {
    Ok(Json(state.directory.get_student(id).await?.into()))
}

#[utoipa::path(
    put, path = "/student/{id}", tag = "student",
    params(("id" = i32, Path, description = "Student id")),
    request_body = StudentRequest,
    responses(
        (status = 200, description = "Updated", body = StudentResponse),
        (status = 400, description = "STUDENT001 / STUDENT002 / REQUEST001", body = crate::errors::ErrorBody),
        (status = 404, description = "STUDENT004", body = crate::errors::ErrorBody),
        (status = 409, description = "STUDENT003", body = crate::errors::ErrorBody)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, JsonApiError>,
    WithRejection(Json(input), _): WithRejection<Json<StudentRequest>, JsonApiError>,
) -> Result<Json<StudentResponse>, JsonApiError> {
    if input.course_ids.is_some() {
        return Err(JsonApiError::bad_request("course_ids can only be set when creating a student"));
    }
    let patch = StudentPatch { roll_number: input.roll_number, first_name: input.first_name, last_name: input.last_name };
    Ok(Json(state.directory.update_student(id, patch).await?.into()))
}

#[utoipa::path(
    delete, path = "/student/{id}", tag = "student",
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student and its enrollments deleted"),
        (status = 404, description = "STUDENT004", body = crate::errors::ErrorBody)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, JsonApiError>,
) -> Result<Json<Message>, JsonApiError> {
    state.directory.delete_student(id).await?;
    info!(student_id = id, "student removed via api");
    Ok(Json(Message::deleted()))
}

#[utoipa::path(
    get, path = "/student/{id}/details", tag = "student",
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student with enrolled courses", body = StudentDetailsResponse),
        (status = 404, description = "ENROLLMENT002", body = crate::errors::ErrorBody)
    )
)]
pub async fn details(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, JsonApiError>,
) -> Result<Json<StudentDetailsResponse>, JsonApiError> {
    let d = state.directory.student_details(id).await?;
    Ok(Json(StudentDetailsResponse {
        student: d.student.into(),
        courses: d.courses.into_iter().map(CourseResponse::from).collect(),
    }))
}
