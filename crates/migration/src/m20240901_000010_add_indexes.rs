use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enrollment: a student is enrolled in a course at most once
        manager
            .create_index(
                Index::create()
                    .name("uniq_enrollment_student_course")
                    .table(Enrollment::Table)
                    .col(Enrollment::StudentId)
                    .col(Enrollment::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Enrollment: index on course_id for the in-use check on course delete
        manager
            .create_index(
                Index::create()
                    .name("idx_enrollment_course")
                    .table(Enrollment::Table)
                    .col(Enrollment::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_enrollment_student_course").table(Enrollment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_enrollment_course").table(Enrollment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Enrollment { Table, StudentId, CourseId }
