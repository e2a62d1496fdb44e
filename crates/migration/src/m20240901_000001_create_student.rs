//! Create `student` table.
//!
//! `roll_number` carries the unique constraint the directory relies on
//! to reject duplicate registrations.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(pk_auto(Student::Id))
                    .col(string_len(Student::RollNumber, 64).unique_key().not_null())
                    .col(string_len(Student::FirstName, 128).not_null())
                    .col(
                        ColumnDef::new(Student::LastName)
                            .string_len(128)
                            .null(),
                    )
                    .col(timestamp_with_time_zone(Student::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Student::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Student::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Student { Table, Id, RollNumber, FirstName, LastName, CreatedAt, UpdatedAt }
