/// Database connection and configuration tests
pub mod db_tests;


use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// In-memory SQLite with the full schema applied.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = crate::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
