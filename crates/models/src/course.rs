use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{enrollment, errors, optional_text, required_text};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub course_code: String,
    pub course_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Enrollment }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Enrollment => Entity::has_many(enrollment::Entity).into() }
    }
}

impl Related<enrollment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Enrollment.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_course_code(code: &str) -> Result<String, errors::ModelError> {
    required_text("course_code", code)
}

pub fn validate_course_name(name: &str) -> Result<String, errors::ModelError> {
    required_text("course_name", name)
}

/// Insert a course. A taken `course_code` surfaces as `ModelError::UniqueViolation`.
pub async fn create(
    db: &DatabaseConnection,
    course_code: &str,
    course_name: &str,
    description: Option<&str>,
) -> Result<Model, errors::ModelError> {
    let course_code = validate_course_code(course_code)?;
    let course_name = validate_course_name(course_name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        course_code: Set(course_code),
        course_name: Set(course_name),
        description: Set(optional_text(description)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_code(db: &DatabaseConnection, course_code: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find().filter(Column::CourseCode.eq(course_code.trim())).one(db).await?)
}

pub async fn hard_delete(db: &DatabaseConnection, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
