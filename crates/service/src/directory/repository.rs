use async_trait::async_trait;
use thiserror::Error;

use models::{course, enrollment, student};

use super::domain::{CoursePatch, NewCourse, NewStudent, StudentPatch};

/// Failures reported by a table store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A duplicate-key write was rejected by a uniqueness constraint.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    /// A referenced row is missing, or a row to delete is still referenced.
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<models::errors::ModelError> for StoreError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::UniqueViolation(m) => StoreError::UniqueViolation(m),
            models::errors::ModelError::ForeignKeyViolation(m) => StoreError::ForeignKeyViolation(m),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Table-store primitives the directory is built on. Implementations must
/// enforce the unique keys (roll number, course code, enrollment pair)
/// atomically and report them as [`StoreError::UniqueViolation`]; dangling
/// or still-referenced rows are [`StoreError::ForeignKeyViolation`].
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Inserts the student and one enrollment per `new.course_ids` entry as a
    /// single unit: either all rows are written or none.
    async fn insert_student(&self, new: &NewStudent) -> Result<student::Model, StoreError>;
    async fn get_student(&self, id: i32) -> Result<Option<student::Model>, StoreError>;
    async fn find_student_by_roll_number(&self, roll_number: &str) -> Result<Option<student::Model>, StoreError>;
    async fn list_students(&self) -> Result<Vec<student::Model>, StoreError>;
    /// Returns `None` when no row has this id.
    async fn update_student(&self, id: i32, patch: &StudentPatch) -> Result<Option<student::Model>, StoreError>;
    /// Removes the student's enrollments and then the student in one unit.
    /// `None` when no student has this id; otherwise the enrollments removed.
    async fn delete_student_cascade(&self, id: i32) -> Result<Option<u64>, StoreError>;

    async fn insert_course(&self, new: &NewCourse) -> Result<course::Model, StoreError>;
    async fn get_course(&self, id: i32) -> Result<Option<course::Model>, StoreError>;
    async fn find_course_by_code(&self, course_code: &str) -> Result<Option<course::Model>, StoreError>;
    async fn list_courses(&self) -> Result<Vec<course::Model>, StoreError>;
    async fn update_course(&self, id: i32, patch: &CoursePatch) -> Result<Option<course::Model>, StoreError>;
    async fn delete_course(&self, id: i32) -> Result<bool, StoreError>;

    async fn insert_enrollment(&self, student_id: i32, course_id: i32) -> Result<enrollment::Model, StoreError>;
    async fn find_enrollment(&self, student_id: i32, course_id: i32) -> Result<Option<enrollment::Model>, StoreError>;
    /// Ordered by enrollment id.
    async fn list_enrollments_for_student(&self, student_id: i32) -> Result<Vec<enrollment::Model>, StoreError>;
    async fn count_enrollments_for_course(&self, course_id: i32) -> Result<u64, StoreError>;
    async fn delete_enrollment(&self, id: i32) -> Result<bool, StoreError>;
}

/// Simple in-memory repository for tests and doc examples
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use sea_orm::prelude::DateTimeWithTimeZone;

    #[derive(Default)]
    struct Tables {
        students: BTreeMap<i32, student::Model>,
        courses: BTreeMap<i32, course::Model>,
        enrollments: BTreeMap<i32, enrollment::Model>,
        last_id: i32,
    }

    impl Tables {
        fn next_id(&mut self) -> i32 {
            self.last_id += 1;
            self.last_id
        }

        fn roll_taken(&self, roll_number: &str, except: Option<i32>) -> bool {
            self.students.values().any(|s| s.roll_number == roll_number && Some(s.id) != except)
        }

        fn code_taken(&self, course_code: &str, except: Option<i32>) -> bool {
            self.courses.values().any(|c| c.course_code == course_code && Some(c.id) != except)
        }
    }

    fn now() -> DateTimeWithTimeZone {
        Utc::now().into()
    }

    /// Mutex-guarded maps keyed by id; one id sequence shared by all tables.
    #[derive(Default)]
    pub struct InMemoryDirectoryRepository {
        tables: Mutex<Tables>,
    }

    impl InMemoryDirectoryRepository {
        fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
            self.tables.lock().map_err(|e| StoreError::Backend(e.to_string()))
        }

        pub fn enrollment_count(&self) -> usize {
            self.tables.lock().map(|t| t.enrollments.len()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl DirectoryRepository for InMemoryDirectoryRepository {
        async fn insert_student(&self, new: &NewStudent) -> Result<student::Model, StoreError> {
            let mut t = self.lock()?;
            if t.roll_taken(&new.roll_number, None) {
                return Err(StoreError::UniqueViolation("student.roll_number".into()));
            }
            if let Some(missing) = new.course_ids.iter().find(|&&c| !t.courses.contains_key(&c)) {
                return Err(StoreError::ForeignKeyViolation(format!("course {missing} does not exist")));
            }
            let id = t.next_id();
            let ts = now();
            let m = student::Model {
                id,
                roll_number: new.roll_number.clone(),
                first_name: new.first_name.clone(),
                last_name: new.last_name.clone(),
                created_at: ts,
                updated_at: ts,
            };
            t.students.insert(id, m.clone());
            for &course_id in &new.course_ids {
                let enrollment_id = t.next_id();
                t.enrollments.insert(
                    enrollment_id,
                    enrollment::Model { id: enrollment_id, student_id: id, course_id, created_at: ts },
                );
            }
            Ok(m)
        }

        async fn get_student(&self, id: i32) -> Result<Option<student::Model>, StoreError> {
            Ok(self.lock()?.students.get(&id).cloned())
        }

        async fn find_student_by_roll_number(&self, roll_number: &str) -> Result<Option<student::Model>, StoreError> {
            Ok(self.lock()?.students.values().find(|s| s.roll_number == roll_number).cloned())
        }

        async fn list_students(&self) -> Result<Vec<student::Model>, StoreError> {
            Ok(self.lock()?.students.values().cloned().collect())
        }

        async fn update_student(&self, id: i32, patch: &StudentPatch) -> Result<Option<student::Model>, StoreError> {
            let mut t = self.lock()?;
            let Some(mut m) = t.students.get(&id).cloned() else { return Ok(None) };
            patch.apply_to(&mut m);
            if t.roll_taken(&m.roll_number, Some(id)) {
                return Err(StoreError::UniqueViolation("student.roll_number".into()));
            }
            m.updated_at = now();
            t.students.insert(id, m.clone());
            Ok(Some(m))
        }

        async fn delete_student_cascade(&self, id: i32) -> Result<Option<u64>, StoreError> {
            let mut t = self.lock()?;
            if t.students.remove(&id).is_none() {
                return Ok(None);
            }
            let before = t.enrollments.len();
            t.enrollments.retain(|_, e| e.student_id != id);
            Ok(Some((before - t.enrollments.len()) as u64))
        }

        async fn insert_course(&self, new: &NewCourse) -> Result<course::Model, StoreError> {
            let mut t = self.lock()?;
            if t.code_taken(&new.course_code, None) {
                return Err(StoreError::UniqueViolation("course.course_code".into()));
            }
            let id = t.next_id();
            let ts = now();
            let m = course::Model {
                id,
                course_code: new.course_code.clone(),
                course_name: new.course_name.clone(),
                description: new.description.clone(),
                created_at: ts,
                updated_at: ts,
            };
            t.courses.insert(id, m.clone());
            Ok(m)
        }

        async fn get_course(&self, id: i32) -> Result<Option<course::Model>, StoreError> {
            Ok(self.lock()?.courses.get(&id).cloned())
        }

        async fn find_course_by_code(&self, course_code: &str) -> Result<Option<course::Model>, StoreError> {
            Ok(self.lock()?.courses.values().find(|c| c.course_code == course_code).cloned())
        }

        async fn list_courses(&self) -> Result<Vec<course::Model>, StoreError> {
            Ok(self.lock()?.courses.values().cloned().collect())
        }

        async fn update_course(&self, id: i32, patch: &CoursePatch) -> Result<Option<course::Model>, StoreError> {
            let mut t = self.lock()?;
            let Some(mut m) = t.courses.get(&id).cloned() else { return Ok(None) };
            patch.apply_to(&mut m);
            if t.code_taken(&m.course_code, Some(id)) {
                return Err(StoreError::UniqueViolation("course.course_code".into()));
            }
            m.updated_at = now();
            t.courses.insert(id, m.clone());
            Ok(Some(m))
        }

        async fn delete_course(&self, id: i32) -> Result<bool, StoreError> {
            let mut t = self.lock()?;
            if t.enrollments.values().any(|e| e.course_id == id) {
                return Err(StoreError::ForeignKeyViolation(format!("course {id} is still referenced by enrollments")));
            }
            Ok(t.courses.remove(&id).is_some())
        }

        async fn insert_enrollment(&self, student_id: i32, course_id: i32) -> Result<enrollment::Model, StoreError> {
            let mut t = self.lock()?;
            if !t.students.contains_key(&student_id) || !t.courses.contains_key(&course_id) {
                return Err(StoreError::ForeignKeyViolation("enrollment references a missing row".into()));
            }
            if t.enrollments.values().any(|e| e.student_id == student_id && e.course_id == course_id) {
                return Err(StoreError::UniqueViolation("enrollment.student_id_course_id".into()));
            }
            let id = t.next_id();
            let m = enrollment::Model { id, student_id, course_id, created_at: now() };
            t.enrollments.insert(id, m.clone());
            Ok(m)
        }

        async fn find_enrollment(&self, student_id: i32, course_id: i32) -> Result<Option<enrollment::Model>, StoreError> {
            Ok(self
                .lock()?
                .enrollments
                .values()
                .find(|e| e.student_id == student_id && e.course_id == course_id)
                .cloned())
        }

        async fn list_enrollments_for_student(&self, student_id: i32) -> Result<Vec<enrollment::Model>, StoreError> {
            Ok(self.lock()?.enrollments.values().filter(|e| e.student_id == student_id).cloned().collect())
        }

        async fn count_enrollments_for_course(&self, course_id: i32) -> Result<u64, StoreError> {
            Ok(self.lock()?.enrollments.values().filter(|e| e.course_id == course_id).count() as u64)
        }

        async fn delete_enrollment(&self, id: i32) -> Result<bool, StoreError> {
            Ok(self.lock()?.enrollments.remove(&id).is_some())
        }
    }
}
