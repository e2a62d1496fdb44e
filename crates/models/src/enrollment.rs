use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, QueryOrder, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{course, errors, student};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Student,
    Course,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Student => Entity::belongs_to(student::Entity)
                .from(Column::StudentId)
                .to(student::Column::Id)
                .into(),
            Relation::Course => Entity::belongs_to(course::Entity)
                .from(Column::CourseId)
                .to(course::Column::Id)
                .into(),
        }
    }
}

impl Related<student::Entity> for Entity {
    fn to() -> RelationDef { Relation::Student.def() }
}

impl Related<course::Entity> for Entity {
    fn to() -> RelationDef { Relation::Course.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert the join row. A repeated (student, course) pair surfaces as
/// `ModelError::UniqueViolation`, a missing student or course as
/// `ModelError::ForeignKeyViolation`.
pub async fn create<C: ConnectionTrait>(db: &C, student_id: i32, course_id: i32) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        student_id: Set(student_id),
        course_id: Set(course_id),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_pair(db: &DatabaseConnection, student_id: i32, course_id: i32) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::CourseId.eq(course_id))
        .one(db)
        .await?)
}

pub async fn list_for_student(db: &DatabaseConnection, student_id: i32) -> Result<Vec<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::StudentId.eq(student_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Delete-where used by the student cascade; returns rows removed.
pub async fn delete_for_student<C: ConnectionTrait>(db: &C, student_id: i32) -> Result<u64, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::StudentId.eq(student_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
