use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState};
use service::directory::{repo::SeaOrmDirectoryRepository, DirectoryService};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect the store, apply migrations and optional demo data, and wrap it
/// in the handler state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!(event = "migrations_applied", "schema is up to date");
    }

    let directory = DirectoryService::new(Arc::new(SeaOrmDirectoryRepository::new(db)));
    if cfg.database.seed_demo_data {
        let report = directory.seed_demo_data().await?;
        info!(
            event = "demo_data",
            students = report.students_created,
            courses = report.courses_created,
            enrollments = report.enrollments_created,
            "demo data ready"
        );
    }
    Ok(AppState::new(directory))
}

pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg).await?;
    Ok(routes::build_router(state, build_cors()))
}

/// Build the app for `cfg` and serve it until the task is dropped.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;
    let addr: SocketAddr = cfg.bind_addr().parse()?;
    info!(%addr, event = "listening", "starting enrollment directory server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
