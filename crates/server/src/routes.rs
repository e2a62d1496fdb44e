use axum::{
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::DirectoryService;

use crate::openapi::ApiDoc;

pub mod courses;
pub mod enrollments;
pub mod students;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub directory: DirectoryService,
}

impl AppState {
    pub fn new(directory: DirectoryService) -> Self { Self { directory } }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Prometheus text exposition of the default registry
pub async fn metrics() -> (StatusCode, String) {
    common::metrics::encode_metrics()
}

/// Build the application router with tracing and CORS layers applied.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let course_routes: Router<AppState> = Router::new()
        .route("/course", get(courses::list).post(courses::create))
        .route("/course/:id", get(courses::get).put(courses::update).delete(courses::delete));

    let student_routes: Router<AppState> = Router::new()
        .route("/student", get(students::list).post(students::create))
        .route("/student/:id", get(students::get).put(students::update).delete(students::delete))
        .route("/student/:id/details", get(students::details));

    let enrollment_routes: Router<AppState> = Router::new()
        .route("/student/:id/course", get(enrollments::list).post(enrollments::enroll))
        .route("/student/:id/course/:course_id", delete(enrollments::unenroll));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(course_routes)
        .merge(student_routes)
        .merge(enrollment_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx responses
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
