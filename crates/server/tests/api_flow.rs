use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

fn memory_config(seed: bool) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.url = "sqlite::memory:".into();
    cfg.database.seed_demo_data = seed;
    cfg
}

async fn build_app() -> anyhow::Result<Router> {
    server::startup::build_app(&memory_config(false)).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&v)?)
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body)?).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, value))
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn course_lifecycle() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, created) = send(
        &app,
        "POST",
        "/course",
        Some(json!({"course_name": "Mathematics", "course_code": "MA101", "course_description": "Intro"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["course_code"], "MA101");
    assert_eq!(created["course_description"], "Intro");
    let id = created["course_id"].as_i64().unwrap();

    let (status, dup) = send(&app, "POST", "/course", Some(json!({"course_name": "Other", "course_code": "MA101"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(dup["error_code"], "COURSE003");

    let (status, updated) = send(&app, "PUT", &format!("/course/{id}"), Some(json!({"course_name": "Maths"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["course_name"], "Maths");
    assert_eq!(updated["course_code"], "MA101");

    let (status, list) = send(&app, "GET", "/course", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, msg) = send(&app, "DELETE", &format!("/course/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(msg["message"], "Successfully Deleted");

    let (status, err) = send(&app, "GET", &format!("/course/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "COURSE004");
    Ok(())
}

#[tokio::test]
async fn request_validation_codes() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, err) = send(&app, "POST", "/student", Some(json!({"first_name": "John"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_code"], "STUDENT001");

    let (status, err) = send(&app, "POST", "/student", Some(json!({"roll_number": "S1", "first_name": "  "}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_code"], "STUDENT002");

    let (_, err) = send(&app, "POST", "/course", Some(json!({"course_code": "MA101"}))).await?;
    assert_eq!(err["error_code"], "COURSE001");
    let (_, err) = send(&app, "POST", "/course", Some(json!({"course_name": "Math"}))).await?;
    assert_eq!(err["error_code"], "COURSE002");

    let (status, err) = send(&app, "POST", "/student", Some(json!({"roll_number": "S1", "first_name": "J", "age": 3}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_code"], "REQUEST001");

    let (status, err) = send(&app, "GET", "/student/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_code"], "REQUEST001");
    Ok(())
}

#[tokio::test]
async fn enrollment_flow_and_cascade() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (_, s) = send(&app, "POST", "/student", Some(json!({"roll_number": "S1001", "first_name": "John"}))).await?;
    let (_, c) = send(&app, "POST", "/course", Some(json!({"course_name": "Math", "course_code": "MA101"}))).await?;
    let sid = s["student_id"].as_i64().unwrap();
    let cid = c["course_id"].as_i64().unwrap();
    assert_eq!(s["last_name"], Value::Null);

    let (status, list) = send(&app, "GET", &format!("/student/{sid}/course"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, err) = send(&app, "POST", &format!("/student/{sid}/course"), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_code"], "ENROLLMENT005");

    let (status, e) = send(&app, "POST", &format!("/student/{sid}/course"), Some(json!({"course_id": cid}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(e["student_id"], sid);
    assert_eq!(e["course_id"], cid);

    let (status, err) = send(&app, "POST", &format!("/student/{sid}/course"), Some(json!({"course_id": cid}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error_code"], "ENROLLMENT003");

    let (_, err) = send(&app, "POST", "/student/9999/course", Some(json!({"course_id": cid}))).await?;
    assert_eq!(err["error_code"], "ENROLLMENT002");
    let (_, err) = send(&app, "POST", &format!("/student/{sid}/course"), Some(json!({"course_id": 9999}))).await?;
    assert_eq!(err["error_code"], "ENROLLMENT001");

    let (status, details) = send(&app, "GET", &format!("/student/{sid}/details"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["student"]["roll_number"], "S1001");
    assert_eq!(details["courses"][0]["course_code"], "MA101");

    let (status, err) = send(&app, "DELETE", &format!("/course/{cid}"), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error_code"], "COURSE005");

    let (status, _) = send(&app, "DELETE", &format!("/student/{sid}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, err) = send(&app, "GET", &format!("/student/{sid}/course"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "ENROLLMENT002");

    let (status, _) = send(&app, "DELETE", &format!("/course/{cid}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unenroll_removes_only_that_pair() -> anyhow::Result<()> {
    let app = server::startup::build_app(&memory_config(true)).await?;

    let (_, students) = send(&app, "GET", "/student", None).await?;
    let sid = students[0]["student_id"].as_i64().unwrap();
    let (_, enrollments) = send(&app, "GET", &format!("/student/{sid}/course"), None).await?;
    let cid = enrollments[0]["course_id"].as_i64().unwrap();

    let (status, msg) = send(&app, "DELETE", &format!("/student/{sid}/course/{cid}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(msg["message"], "Successfully Deleted");

    let (status, err) = send(&app, "DELETE", &format!("/student/{sid}/course/{cid}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "ENROLLMENT004");

    let (_, other) = send(&app, "GET", &format!("/student/{}/course", students[1]["student_id"]), None).await?;
    assert_eq!(other.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn metrics_expose_operation_counters() -> anyhow::Result<()> {
    let app = build_app().await?;
    send(&app, "GET", "/student", None).await?;
    let resp = app.clone().oneshot(Request::builder().uri("/metrics").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("directory_operations_total"));
    assert!(text.contains("operation=\"list_students\""));
    Ok(())
}

#[tokio::test]
async fn unknown_ids_map_to_not_found_codes() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (_, c) = send(&app, "POST", "/course", Some(json!({"course_name": "Math", "course_code": "MA101"}))).await?;
    let cid = c["course_id"].as_i64().unwrap();

    let (status, err) = send(&app, "DELETE", &format!("/student/9999/course/{cid}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "ENROLLMENT002");

    let (_, s) = send(&app, "POST", "/student", Some(json!({"roll_number": "S1001", "first_name": "John"}))).await?;
    let sid = s["student_id"].as_i64().unwrap();
    let (status, err) = send(&app, "DELETE", &format!("/student/{sid}/course/9999"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "ENROLLMENT001");

    let (status, err) = send(&app, "PUT", "/course/9999", Some(json!({"course_name": "Maths"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "COURSE004");

    let (status, err) = send(&app, "DELETE", "/course/9999", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "COURSE004");

    let (status, err) = send(&app, "PUT", "/student/9999", Some(json!({"first_name": "Jane"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "STUDENT004");
    Ok(())
}

#[tokio::test]
async fn create_student_with_course_ids() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (_, c) = send(&app, "POST", "/course", Some(json!({"course_name": "Math", "course_code": "MA101"}))).await?;
    let cid = c["course_id"].as_i64().unwrap();

    let (status, s) = send(
        &app,
        "POST",
        "/student",
        Some(json!({"roll_number": "S1001", "first_name": "John", "course_ids": [cid]})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let sid = s["student_id"].as_i64().unwrap();
    let (_, list) = send(&app, "GET", &format!("/student/{sid}/course"), None).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["course_id"], cid);

    let (status, err) = send(
        &app,
        "POST",
        "/student",
        Some(json!({"roll_number": "S1002", "first_name": "Jane", "course_ids": [cid, 9999]})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "ENROLLMENT001");
    let (_, students) = send(&app, "GET", "/student", None).await?;
    assert_eq!(students.as_array().map(Vec::len), Some(1));

    let (status, err) = send(&app, "PUT", &format!("/student/{sid}"), Some(json!({"course_ids": [cid]}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_code"], "REQUEST001");
    Ok(())
}
