use std::fmt;

use thiserror::Error;

/// Required input fields the directory validates by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RollNumber,
    FirstName,
    CourseCode,
    CourseName,
    CourseId,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::RollNumber => "roll_number",
            Field::FirstName => "first_name",
            Field::CourseCode => "course_code",
            Field::CourseName => "course_name",
            Field::CourseId => "course_id",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Field::RollNumber => "Roll Number",
            Field::FirstName => "First Name",
            Field::CourseCode => "Course Code",
            Field::CourseName => "Course Name",
            Field::CourseId => "Course Id",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Student,
    Course,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Student => f.write_str("Student"),
            EntityKind::Course => f.write_str("Course"),
        }
    }
}

/// Every failure a directory operation can report.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0} is required")]
    MissingField(Field),
    #[error("Roll Number already exists: {0}")]
    DuplicateRollNumber(String),
    #[error("Course Code already exists: {0}")]
    DuplicateCourseCode(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: i32 },
    #[error("Student does not exist: {0}")]
    StudentNotFound(i32),
    #[error("Course does not exist: {0}")]
    CourseNotFound(i32),
    #[error("Student {student_id} is already enrolled in course {course_id}")]
    AlreadyEnrolled { student_id: i32, course_id: i32 },
    #[error("Enrollment for student {student_id} in course {course_id} not found")]
    EnrollmentNotFound { student_id: i32, course_id: i32 },
    #[error("Course {course_id} still has {enrollments} enrollment(s)")]
    CourseInUse { course_id: i32, enrollments: u64 },
    #[error("storage error: {0}")]
    Storage(String),
}

impl DirectoryError {
    pub fn not_found(kind: EntityKind, id: i32) -> Self { Self::NotFound { kind, id } }

    /// Stable error code for external mapping/logging
    pub fn code(&self) -> &'static str {
        match self {
            DirectoryError::MissingField(Field::RollNumber) => "STUDENT001",
            DirectoryError::MissingField(Field::FirstName) => "STUDENT002",
            DirectoryError::DuplicateRollNumber(_) => "STUDENT003",
            DirectoryError::NotFound { kind: EntityKind::Student, .. } => "STUDENT004",
            DirectoryError::MissingField(Field::CourseName) => "COURSE001",
            DirectoryError::MissingField(Field::CourseCode) => "COURSE002",
            DirectoryError::DuplicateCourseCode(_) => "COURSE003",
            DirectoryError::NotFound { kind: EntityKind::Course, .. } => "COURSE004",
            DirectoryError::CourseInUse { .. } => "COURSE005",
            DirectoryError::CourseNotFound(_) => "ENROLLMENT001",
            DirectoryError::StudentNotFound(_) => "ENROLLMENT002",
            DirectoryError::AlreadyEnrolled { .. } => "ENROLLMENT003",
            DirectoryError::EnrollmentNotFound { .. } => "ENROLLMENT004",
            DirectoryError::MissingField(Field::CourseId) => "ENROLLMENT005",
            DirectoryError::Storage(_) => "INTERNAL001",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let all = [
            DirectoryError::MissingField(Field::RollNumber),
            DirectoryError::MissingField(Field::FirstName),
            DirectoryError::MissingField(Field::CourseCode),
            DirectoryError::MissingField(Field::CourseName),
            DirectoryError::MissingField(Field::CourseId),
            DirectoryError::DuplicateRollNumber("S1".into()),
            DirectoryError::DuplicateCourseCode("C1".into()),
            DirectoryError::not_found(EntityKind::Student, 1),
            DirectoryError::not_found(EntityKind::Course, 1),
            DirectoryError::StudentNotFound(1),
            DirectoryError::CourseNotFound(1),
            DirectoryError::AlreadyEnrolled { student_id: 1, course_id: 2 },
            DirectoryError::EnrollmentNotFound { student_id: 1, course_id: 2 },
            DirectoryError::CourseInUse { course_id: 2, enrollments: 1 },
            DirectoryError::Storage("boom".into()),
        ];
        let mut codes: Vec<_> = all.iter().map(DirectoryError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn messages_read_like_the_api() {
        assert_eq!(DirectoryError::MissingField(Field::CourseName).to_string(), "Course Name is required");
        assert_eq!(DirectoryError::StudentNotFound(7).to_string(), "Student does not exist: 7");
        assert_eq!(DirectoryError::not_found(EntityKind::Course, 3).to_string(), "Course not found: 3");
    }
}
