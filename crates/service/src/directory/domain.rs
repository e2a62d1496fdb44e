use serde::{Deserialize, Serialize};

use crate::errors::{DirectoryError, Field};

/// Turn an optional wire value into a required one; absent or blank input
/// is `MissingField`.
pub fn required(field: Field, value: Option<String>) -> Result<String, DirectoryError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DirectoryError::MissingField(field)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    models::optional_text(value.as_deref())
}

/// Student creation input. `course_ids` are enrolled together with the
/// student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub roll_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
    #[serde(default)]
    pub course_ids: Vec<i32>,
}

impl NewStudent {
    pub fn new(roll_number: impl Into<String>, first_name: impl Into<String>, last_name: Option<&str>) -> Self {
        Self {
            roll_number: roll_number.into(),
            first_name: first_name.into(),
            last_name: last_name.map(str::to_string),
            course_ids: Vec::new(),
        }
    }

    pub fn with_courses(mut self, course_ids: impl IntoIterator<Item = i32>) -> Self {
        self.course_ids = course_ids.into_iter().collect();
        self
    }

    /// Trim and check required fields; roll number is checked first.
    /// Repeated course ids collapse to their first occurrence.
    pub fn validated(self) -> Result<Self, DirectoryError> {
        let mut course_ids = Vec::with_capacity(self.course_ids.len());
        for id in self.course_ids {
            if !course_ids.contains(&id) {
                course_ids.push(id);
            }
        }
        Ok(Self {
            roll_number: required(Field::RollNumber, Some(self.roll_number))?,
            first_name: required(Field::FirstName, Some(self.first_name))?,
            last_name: optional(self.last_name),
            course_ids,
        })
    }
}

/// Partial update of a student. Only these fields are mutable; `None`
/// leaves the stored value unchanged. A blank `last_name` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPatch {
    pub roll_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.roll_number.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }

    pub fn validated(self) -> Result<Self, DirectoryError> {
        Ok(Self {
            roll_number: self.roll_number.map(|v| required(Field::RollNumber, Some(v))).transpose()?,
            first_name: self.first_name.map(|v| required(Field::FirstName, Some(v))).transpose()?,
            last_name: self.last_name.map(|v| v.trim().to_string()),
        })
    }

    /// Apply an already validated patch to a loaded record.
    pub fn apply_to(&self, m: &mut models::student::Model) {
        if let Some(v) = &self.roll_number { m.roll_number = v.clone(); }
        if let Some(v) = &self.first_name { m.first_name = v.clone(); }
        if let Some(v) = &self.last_name { m.last_name = models::optional_text(Some(v.as_str())); }
    }
}

/// Course creation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub course_code: String,
    pub course_name: String,
    pub description: Option<String>,
}

impl NewCourse {
    pub fn new(course_code: impl Into<String>, course_name: impl Into<String>, description: Option<&str>) -> Self {
        Self { course_code: course_code.into(), course_name: course_name.into(), description: description.map(str::to_string) }
    }

    /// Course name is checked before course code.
    pub fn validated(self) -> Result<Self, DirectoryError> {
        let course_name = required(Field::CourseName, Some(self.course_name))?;
        let course_code = required(Field::CourseCode, Some(self.course_code))?;
        Ok(Self { course_code, course_name, description: optional(self.description) })
    }
}

/// Partial update of a course; same rules as [`StudentPatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursePatch {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub description: Option<String>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        self.course_code.is_none() && self.course_name.is_none() && self.description.is_none()
    }

    pub fn validated(self) -> Result<Self, DirectoryError> {
        Ok(Self {
            course_code: self.course_code.map(|v| required(Field::CourseCode, Some(v))).transpose()?,
            course_name: self.course_name.map(|v| required(Field::CourseName, Some(v))).transpose()?,
            description: self.description.map(|v| v.trim().to_string()),
        })
    }

    pub fn apply_to(&self, m: &mut models::course::Model) {
        if let Some(v) = &self.course_code { m.course_code = v.clone(); }
        if let Some(v) = &self.course_name { m.course_name = v.clone(); }
        if let Some(v) = &self.description { m.description = models::optional_text(Some(v.as_str())); }
    }
}

/// A student with the courses it is enrolled in, in enrollment order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDetails {
    pub student: models::student::Model,
    pub courses: Vec<models::course::Model>,
}

/// Counts of what a seeding run inserted (existing rows are reused).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub students_created: u32,
    pub courses_created: u32,
    pub enrollments_created: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_student_trims_and_checks_roll_first() {
        let ok = NewStudent::new(" S1 ", " John ", Some("  ")).validated().unwrap();
        assert_eq!(ok.roll_number, "S1");
        assert_eq!(ok.first_name, "John");
        assert_eq!(ok.last_name, None);

        let err = NewStudent::new("", "", None).validated().unwrap_err();
        assert!(matches!(err, DirectoryError::MissingField(Field::RollNumber)));
        let err = NewStudent::new("S1", " ", None).validated().unwrap_err();
        assert!(matches!(err, DirectoryError::MissingField(Field::FirstName)));
    }

    #[test]
    fn new_student_course_ids_keep_first_occurrence() {
        let ok = NewStudent::new("S1", "John", None).with_courses([3, 1, 3, 2, 1]).validated().unwrap();
        assert_eq!(ok.course_ids, vec![3, 1, 2]);
    }

    #[test]
    fn new_course_checks_name_before_code() {
        let err = NewCourse::new("", "", None).validated().unwrap_err();
        assert!(matches!(err, DirectoryError::MissingField(Field::CourseName)));
        let err = NewCourse::new("", "Math", None).validated().unwrap_err();
        assert!(matches!(err, DirectoryError::MissingField(Field::CourseCode)));
    }

    #[test]
    fn patch_rejects_blanking_required_field() {
        let p = StudentPatch { first_name: Some("  ".into()), ..Default::default() };
        assert!(matches!(p.validated(), Err(DirectoryError::MissingField(Field::FirstName))));
        let p = CoursePatch { course_code: Some("".into()), ..Default::default() };
        assert!(matches!(p.validated(), Err(DirectoryError::MissingField(Field::CourseCode))));
    }

    #[test]
    fn patch_applies_only_provided_fields() {
        let now = chrono::Utc::now().into();
        let mut m = models::student::Model {
            id: 1,
            roll_number: "S1".into(),
            first_name: "John".into(),
            last_name: Some("Doe".into()),
            created_at: now,
            updated_at: now,
        };
        let p = StudentPatch { first_name: Some("Jon".into()), ..Default::default() }.validated().unwrap();
        p.apply_to(&mut m);
        assert_eq!(m.first_name, "Jon");
        assert_eq!(m.roll_number, "S1");
        assert_eq!(m.last_name.as_deref(), Some("Doe"));

        StudentPatch { last_name: Some(String::new()), ..Default::default() }.apply_to(&mut m);
        assert_eq!(m.last_name, None);
        assert!(StudentPatch::default().is_empty());
    }
}
