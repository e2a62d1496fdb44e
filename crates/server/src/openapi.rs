use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::errors::ErrorBody;
use crate::routes::courses::{CourseRequest, CourseResponse};
use crate::routes::enrollments::{EnrollRequest, EnrollmentResponse};
use crate::routes::students::{StudentDetailsResponse, StudentRequest, StudentResponse};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::courses::list,
        crate::routes::courses::create,
        crate::routes::courses::get,
        crate::routes::courses::update,
        crate::routes::courses::delete,
        crate::routes::students::list,
        crate::routes::students::create,
        crate::routes::students::get,
        crate::routes::students::update,
        crate::routes::students::delete,
        crate::routes::students::details,
        crate::routes::enrollments::list,
        crate::routes::enrollments::enroll,
        crate::routes::enrollments::unenroll,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            CourseRequest,
            CourseResponse,
            StudentRequest,
            StudentResponse,
            StudentDetailsResponse,
            EnrollRequest,
            EnrollmentResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "course"),
        (name = "student"),
        (name = "enrollment")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for p in ["/course", "/course/{id}", "/student", "/student/{id}", "/student/{id}/course", "/student/{id}/course/{course_id}", "/student/{id}/details"] {
            assert!(paths.contains(&p), "missing {p}");
        }
    }
}
