use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::info;

use common::types::Message;
use models::course;
use service::directory::domain::{CoursePatch, NewCourse};

use super::AppState;
use crate::errors::JsonApiError;

/// Body of `POST /course` and `PUT /course/{id}`. Every field is optional
/// on the wire; creation requires `course_name` and `course_code`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CourseRequest {
    pub course_name: Option<String>,
    pub course_code: Option<String>,
    pub course_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub course_id: i32,
    pub course_name: String,
    pub course_code: String,
    pub course_description: Option<String>,
}

impl From<course::Model> for CourseResponse {
    fn from(m: course::Model) -> Self {
        Self {
            course_id: m.id,
            course_name: m.course_name,
            course_code: m.course_code,
            course_description: m.description,
        }
    }
}

#[utoipa::path(
    get, path = "/course", tag = "course",
    responses((status = 200, description = "All courses ordered by id", body = [CourseResponse]))
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CourseResponse>>, JsonApiError> {
    let courses = state.directory.list_courses().await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

#[utoipa::path(
    post, path = "/course", tag = "course",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Created", body = CourseResponse),
        (status = 400, description = "COURSE001 / COURSE002 / REQUEST001", body = crate::errors::ErrorBody),
        (status = 409, description = "COURSE003", body = crate::errors::ErrorBody)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<CourseRequest>, JsonApiError>,
) -> Result<(StatusCode, Json<CourseResponse>), JsonApiError> {
    let new = NewCourse {
        course_code: input.course_code.unwrap_or_default(),
        course_name: input.course_name.unwrap_or_default(),
        description: input.course_description,
    };
    let created = state.directory.create_course(new).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get, path = "/course/{id}", tag = "course",
    params(("id" = i32, Path, description = "Course id")),
    responses(
        (status = 200, description = "OK", body = CourseResponse),
        (status = 404, description = "COURSE004", body = crate::errors::ErrorBody)
    )
)]
pub async fn get(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, JsonApiError>,
) -> Result<Json<CourseResponse>, JsonApiError> {
    Ok(Json(state.directory.get_course(id).await?.into()))
}

#[utoipa::path(
    put, path = "/course/{id}", tag = "course",
    params(("id" = i32, Path, description = "Course id")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Updated", body = CourseResponse),
        (status = 400, description = "COURSE001 / COURSE002 / REQUEST001", body = crate::errors::ErrorBody),
        (status = 404, description = "COURSE004", body = crate::errors::ErrorBody),
        (status = 409, description = "COURSE003", body = crate::errors::ErrorBody)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, JsonApiError>,
    WithRejection(Json(input), _): WithRejection<Json<CourseRequest>, JsonApiError>,
) -> Result<Json<CourseResponse>, JsonApiError> {
    let patch = CoursePatch {
        course_code: input.course_code,
        course_name: input.course_name,
        description: input.course_description,
    };
    Ok(Json(state.directory.update_course(id, patch).await?.into()))
}

#[utoipa::path(
    delete, path = "/course/{id}", tag = "course",
    params(("id" = i32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Successfully Deleted"),
        (status = 404, description = "COURSE004", body = crate::errors::ErrorBody),
        (status = 409, description = "COURSE005: course still has enrollments", body = crate::errors::ErrorBody)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, JsonApiError>,
) -> Result<Json<Message>, JsonApiError> {
    state.directory.delete_course(id).await?;
    info!(course_id = id, "course removed via api");
    Ok(Json(Message::deleted()))
}
