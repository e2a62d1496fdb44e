use crate::db::connect_with_config;
use configs::DatabaseConfig;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use migration::MigratorTrait;
use anyhow::Result;

/// Test basic in-memory connection answers a trivial query
#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let db = crate::db::connect_in_memory().await?;
    assert_eq!(db.get_database_backend(), DatabaseBackend::Sqlite);

    let stmt = Statement::from_string(DatabaseBackend::Sqlite, "SELECT 1 as test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);
    Ok(())
}

/// Migrations apply cleanly and can be rolled back and re-applied
#[tokio::test]
async fn test_migrations_up_down_up() -> Result<()> {
    let db = crate::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    migration::Migrator::down(&db, None).await?;
    migration::Migrator::up(&db, None).await?;

    let stmt = Statement::from_string(
        DatabaseBackend::Sqlite,
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('student', 'course', 'enrollment')".to_string(),
    );
    let rows = db.query_all(stmt).await?;
    assert_eq!(rows.len(), 3);
    Ok(())
}

/// Unreachable database is reported as an error, not a panic
#[tokio::test]
async fn test_connection_failure_handling() {
    let config = DatabaseConfig {
        url: "sqlite:///nonexistent-dir-for-tests/db.sqlite3?mode=ro".into(),
        connect_timeout_secs: 1,
        acquire_timeout_secs: 1,
        ..Default::default()
    };
    let result = connect_with_config(&config).await;
    assert!(result.is_err());
}
