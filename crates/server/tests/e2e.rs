use std::net::SocketAddr;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let mut cfg = AppConfig::default();
    cfg.database.url = "sqlite::memory:".into();
    let app = server::startup::build_app(&cfg).await?;

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_enroll_and_list() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let student = c.post(format!("{}/student", app.base_url))
        .json(&json!({"roll_number": "S1001", "first_name": "John", "last_name": "Doe"}))
        .send().await?;
    assert_eq!(student.status(), HttpStatusCode::CREATED);
    let student = student.json::<serde_json::Value>().await?;

    let course = c.post(format!("{}/course", app.base_url))
        .json(&json!({"course_name": "Math", "course_code": "MA101"}))
        .send().await?;
    assert_eq!(course.status(), HttpStatusCode::CREATED);
    let course = course.json::<serde_json::Value>().await?;

    let res = c.post(format!("{}/student/{}/course", app.base_url, student["student_id"]))
        .json(&json!({"course_id": course["course_id"]}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let enrollment = res.json::<serde_json::Value>().await?;
    assert!(enrollment["enrollment_id"].as_i64().unwrap_or_default() > 0);

    let res = c.get(format!("{}/student/{}/course", app.base_url, student["student_id"])).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let rows = res.json::<serde_json::Value>().await?;
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
    assert_eq!(rows[0]["course_id"], course["course_id"]);
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/api-docs/openapi.json", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<serde_json::Value>().await?;
    assert!(doc["paths"]["/student/{id}/course"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_unparseable_bind_address_is_an_error() -> anyhow::Result<()> {
    let mut cfg = AppConfig::default();
    cfg.database.url = "sqlite::memory:".into();
    cfg.server.host = "not a host".into();
    let err = server::startup::run_with_config(cfg).await.unwrap_err();
    assert!(err.to_string().contains("invalid socket address"));
    Ok(())
}
