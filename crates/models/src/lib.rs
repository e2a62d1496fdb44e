//! SeaORM entities for the directory schema plus the field rules shared by
//! every writer: required text must be non-blank, optional text collapses to
//! `NULL` when blank.

pub mod errors;
pub mod db;
pub mod student;
pub mod course;
pub mod enrollment;

use errors::ModelError;

/// Trim a required text field; blank values are rejected.
pub fn required_text(field: &str, value: &str) -> Result<String, ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    Ok(v.to_string())
}

/// Trim an optional text field; blank becomes `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests;
