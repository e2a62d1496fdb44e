use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{enrollment, errors, optional_text, required_text};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub roll_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Enrollment,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Enrollment => Entity::has_many(enrollment::Entity).into() }
    }
}

impl Related<enrollment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Enrollment.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_roll_number(roll_number: &str) -> Result<String, errors::ModelError> {
    required_text("roll_number", roll_number)
}

pub fn validate_first_name(first_name: &str) -> Result<String, errors::ModelError> {
    required_text("first_name", first_name)
}

/// Insert a student. A taken `roll_number` surfaces as `ModelError::UniqueViolation`.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    roll_number: &str,
    first_name: &str,
    last_name: Option<&str>,
) -> Result<Model, errors::ModelError> {
    let roll_number = validate_roll_number(roll_number)?;
    let first_name = validate_first_name(first_name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        roll_number: Set(roll_number),
        first_name: Set(first_name),
        last_name: Set(optional_text(last_name)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_roll_number(db: &DatabaseConnection, roll_number: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find().filter(Column::RollNumber.eq(roll_number.trim())).one(db).await?)
}

pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
