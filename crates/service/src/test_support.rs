#![cfg(test)]
use std::sync::Arc;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use crate::directory::{repo::SeaOrmDirectoryRepository, DirectoryService};

/// Private in-memory SQLite database with the schema migrated.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = models::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn sqlite_service() -> Result<DirectoryService, anyhow::Error> {
    Ok(sqlite_service_with_db().await?.0)
}

/// SeaORM-backed service plus a handle on its database for direct SQL.
pub async fn sqlite_service_with_db() -> Result<(DirectoryService, DatabaseConnection), anyhow::Error> {
    let db = get_db().await?;
    let svc = DirectoryService::new(Arc::new(SeaOrmDirectoryRepository::new(db.clone())));
    Ok((svc, db))
}
