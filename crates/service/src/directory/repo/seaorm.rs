use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use models::{course, enrollment, student};

use crate::directory::domain::{CoursePatch, NewCourse, NewStudent, StudentPatch};
use crate::directory::repository::{DirectoryRepository, StoreError};

fn db_err(e: sea_orm::DbErr) -> StoreError {
    StoreError::from(models::errors::ModelError::from(e))
}

/// SeaORM-backed repository; works against Postgres and SQLite.
#[derive(Clone)]
pub struct SeaOrmDirectoryRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmDirectoryRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl DirectoryRepository for SeaOrmDirectoryRepository {
    async fn insert_student(&self, new: &NewStudent) -> Result<student::Model, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let created = student::create(&txn, &new.roll_number, &new.first_name, new.last_name.as_deref()).await?;
        for &course_id in &new.course_ids {
            enrollment::create(&txn, created.id, course_id).await?;
        }
        txn.commit().await.map_err(db_err)?;
        Ok(created)
    }

    async fn get_student(&self, id: i32) -> Result<Option<student::Model>, StoreError> {
        student::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)
    }

    async fn find_student_by_roll_number(&self, roll_number: &str) -> Result<Option<student::Model>, StoreError> {
        Ok(student::find_by_roll_number(&self.db, roll_number).await?)
    }

    async fn list_students(&self) -> Result<Vec<student::Model>, StoreError> {
        student::Entity::find().order_by_asc(student::Column::Id).all(&self.db).await.map_err(db_err)
    }

    async fn update_student(&self, id: i32, patch: &StudentPatch) -> Result<Option<student::Model>, StoreError> {
        let Some(existing) = student::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)? else {
            return Ok(None);
        };
        let mut am: student::ActiveModel = existing.into();
        if let Some(v) = &patch.roll_number { am.roll_number = Set(v.clone()); }
        if let Some(v) = &patch.first_name { am.first_name = Set(v.clone()); }
        if let Some(v) = &patch.last_name { am.last_name = Set(models::optional_text(Some(v.as_str()))); }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await.map_err(db_err)?;
        Ok(Some(updated))
    }

    async fn delete_student_cascade(&self, id: i32) -> Result<Option<u64>, StoreError> {
        // dropping an uncommitted transaction rolls it back
        let txn = self.db.begin().await.map_err(db_err)?;
        let removed = enrollment::delete_for_student(&txn, id).await?;
        if !student::hard_delete(&txn, id).await? {
            return Ok(None);
        }
        txn.commit().await.map_err(db_err)?;
        Ok(Some(removed))
    }

    async fn insert_course(&self, new: &NewCourse) -> Result<course::Model, StoreError> {
        Ok(course::create(&self.db, &new.course_code, &new.course_name, new.description.as_deref()).await?)
    }

    async fn get_course(&self, id: i32) -> Result<Option<course::Model>, StoreError> {
        course::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)
    }

    async fn find_course_by_code(&self, course_code: &str) -> Result<Option<course::Model>, StoreError> {
        Ok(course::find_by_code(&self.db, course_code).await?)
    }

    async fn list_courses(&self) -> Result<Vec<course::Model>, StoreError> {
        course::Entity::find().order_by_asc(course::Column::Id).all(&self.db).await.map_err(db_err)
    }

    async fn update_course(&self, id: i32, patch: &CoursePatch) -> Result<Option<course::Model>, StoreError> {
        let Some(existing) = course::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)? else {
            return Ok(None);
        };
        let mut am: course::ActiveModel = existing.into();
        if let Some(v) = &patch.course_code { am.course_code = Set(v.clone()); }
        if let Some(v) = &patch.course_name { am.course_name = Set(v.clone()); }
        if let Some(v) = &patch.description { am.description = Set(models::optional_text(Some(v.as_str()))); }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await.map_err(db_err)?;
        Ok(Some(updated))
    }

    async fn delete_course(&self, id: i32) -> Result<bool, StoreError> {
        Ok(course::hard_delete(&self.db, id).await?)
    }

    async fn insert_enrollment(&self, student_id: i32, course_id: i32) -> Result<enrollment::Model, StoreError> {
        Ok(enrollment::create(&self.db, student_id, course_id).await?)
    }

    async fn find_enrollment(&self, student_id: i32, course_id: i32) -> Result<Option<enrollment::Model>, StoreError> {
        Ok(enrollment::find_pair(&self.db, student_id, course_id).await?)
    }

    async fn list_enrollments_for_student(&self, student_id: i32) -> Result<Vec<enrollment::Model>, StoreError> {
        Ok(enrollment::list_for_student(&self.db, student_id).await?)
    }

    async fn count_enrollments_for_course(&self, course_id: i32) -> Result<u64, StoreError> {
        enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn delete_enrollment(&self, id: i32) -> Result<bool, StoreError> {
        let res = enrollment::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
