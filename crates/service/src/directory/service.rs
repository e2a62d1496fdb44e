use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use models::{course, enrollment, student};

use super::domain::{CoursePatch, NewCourse, NewStudent, SeedReport, StudentDetails, StudentPatch};
use super::repository::{DirectoryRepository, StoreError};
use crate::errors::{DirectoryError, EntityKind};

fn storage(e: StoreError) -> DirectoryError {
    DirectoryError::Storage(e.to_string())
}

/// Time a directory operation and record its outcome in the metrics registry.
async fn observed<T, F>(operation: &'static str, fut: F) -> Result<T, DirectoryError>
where
    F: Future<Output = Result<T, DirectoryError>>,
{
    let started = Instant::now();
    let res = fut.await;
    let outcome = match &res {
        Ok(_) => "ok",
        Err(e) => e.code(),
    };
    common::metrics::record_operation(operation, outcome, started.elapsed().as_secs_f64());
    if let Err(DirectoryError::Storage(detail)) = &res {
        warn!(event = "storage_error", operation, %detail);
    }
    res
}

/// Student/course/enrollment business service, independent of the web layer.
#[derive(Clone)]
pub struct DirectoryService {
    repo: Arc<dyn DirectoryRepository>,
}

impl DirectoryService {
    pub fn new(repo: Arc<dyn DirectoryRepository>) -> Self { Self { repo } }

    async fn require_student(&self, id: i32) -> Result<student::Model, DirectoryError> {
        self.repo.get_student(id).await.map_err(storage)?.ok_or(DirectoryError::not_found(EntityKind::Student, id))
    }

    async fn require_course(&self, id: i32) -> Result<course::Model, DirectoryError> {
        self.repo.get_course(id).await.map_err(storage)?.ok_or(DirectoryError::not_found(EntityKind::Course, id))
    }

    /// Both references of an enrollment must resolve; the student is checked first.
    async fn require_pair(&self, student_id: i32, course_id: i32) -> Result<(), DirectoryError> {
        if self.repo.get_student(student_id).await.map_err(storage)?.is_none() {
            return Err(DirectoryError::StudentNotFound(student_id));
        }
        if self.repo.get_course(course_id).await.map_err(storage)?.is_none() {
            return Err(DirectoryError::CourseNotFound(course_id));
        }
        Ok(())
    }

    /// The first id in `course_ids` with no course row is `CourseNotFound`.
    async fn require_courses(&self, course_ids: &[i32]) -> Result<(), DirectoryError> {
        for &course_id in course_ids {
            if self.repo.get_course(course_id).await.map_err(storage)?.is_none() {
                return Err(DirectoryError::CourseNotFound(course_id));
            }
        }
        Ok(())
    }

    /// Create a student, enrolling it in `input.course_ids` in the same write.
    /// An unknown course id is `CourseNotFound` and nothing is stored.
    ///
    /// # Examples
    /// ```
    /// use service::directory::{DirectoryService, domain::NewStudent, repository::memory::InMemoryDirectoryRepository};
    /// use std::sync::Arc;
    /// let svc = DirectoryService::new(Arc::new(InMemoryDirectoryRepository::default()));
    /// let s = tokio_test::block_on(svc.create_student(NewStudent::new("S1001", "John", Some("Doe")))).unwrap();
    /// assert_eq!(s.roll_number, "S1001");
    /// ```
    #[instrument(skip(self, input), fields(roll_number = %input.roll_number))]
    pub async fn create_student(&self, input: NewStudent) -> Result<student::Model, DirectoryError> {
        observed("create_student", async {
            let input = input.validated()?;
            self.require_courses(&input.course_ids).await?;
            let created = match self.repo.insert_student(&input).await {
                Ok(created) => created,
                Err(StoreError::UniqueViolation(_)) => {
                    return Err(DirectoryError::DuplicateRollNumber(input.roll_number.clone()))
                }
                Err(StoreError::ForeignKeyViolation(detail)) => {
                    // a course vanished after the existence check
                    self.require_courses(&input.course_ids).await?;
                    return Err(storage(StoreError::ForeignKeyViolation(detail)));
                }
                Err(other) => return Err(storage(other)),
            };
            info!(
                event = "student_created",
                student_id = created.id,
                roll_number = %created.roll_number,
                enrollments = input.course_ids.len()
            );
            Ok::<_, DirectoryError>(created)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_student(&self, id: i32) -> Result<student::Model, DirectoryError> {
        observed("get_student", self.require_student(id)).await
    }

    #[instrument(skip(self))]
    pub async fn list_students(&self) -> Result<Vec<student::Model>, DirectoryError> {
        observed("list_students", async { self.repo.list_students().await.map_err(storage) }).await
    }

    /// Apply a partial update. Changing `roll_number` to one already taken is
    /// `DuplicateRollNumber`.
    #[instrument(skip(self, patch))]
    pub async fn update_student(&self, id: i32, patch: StudentPatch) -> Result<student::Model, DirectoryError> {
        observed("update_student", async {
            let patch = patch.validated()?;
            if patch.is_empty() {
                return self.require_student(id).await;
            }
            let updated = self
                .repo
                .update_student(id, &patch)
                .await
                .map_err(|e| match e {
                    StoreError::UniqueViolation(_) => {
                        DirectoryError::DuplicateRollNumber(patch.roll_number.clone().unwrap_or_default())
                    }
                    other => storage(other),
                })?
                .ok_or(DirectoryError::not_found(EntityKind::Student, id))?;
            info!(event = "student_updated", student_id = id);
            Ok::<_, DirectoryError>(updated)
        })
        .await
    }

    /// Delete a student together with all of its enrollments. Both go in one
    /// store write, so a failure leaves the student and its enrollments intact.
    #[instrument(skip(self))]
    pub async fn delete_student(&self, id: i32) -> Result<(), DirectoryError> {
        observed("delete_student", async {
            let removed = self
                .repo
                .delete_student_cascade(id)
                .await
                .map_err(storage)?
                .ok_or(DirectoryError::not_found(EntityKind::Student, id))?;
            info!(event = "student_deleted", student_id = id, enrollments_removed = removed);
            Ok::<_, DirectoryError>(())
        })
        .await
    }

    #[instrument(skip(self, input), fields(course_code = %input.course_code))]
    pub async fn create_course(&self, input: NewCourse) -> Result<course::Model, DirectoryError> {
        observed("create_course", async {
            let input = input.validated()?;
            let created = self.repo.insert_course(&input).await.map_err(|e| match e {
                StoreError::UniqueViolation(_) => DirectoryError::DuplicateCourseCode(input.course_code.clone()),
                other => storage(other),
            })?;
            info!(event = "course_created", course_id = created.id, course_code = %created.course_code);
            Ok::<_, DirectoryError>(created)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_course(&self, id: i32) -> Result<course::Model, DirectoryError> {
        observed("get_course", self.require_course(id)).await
    }

    #[instrument(skip(self))]
    pub async fn list_courses(&self) -> Result<Vec<course::Model>, DirectoryError> {
        observed("list_courses", async { self.repo.list_courses().await.map_err(storage) }).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_course(&self, id: i32, patch: CoursePatch) -> Result<course::Model, DirectoryError> {
        observed("update_course", async {
            let patch = patch.validated()?;
            if patch.is_empty() {
                return self.require_course(id).await;
            }
            let updated = self
                .repo
                .update_course(id, &patch)
                .await
                .map_err(|e| match e {
                    StoreError::UniqueViolation(_) => {
                        DirectoryError::DuplicateCourseCode(patch.course_code.clone().unwrap_or_default())
                    }
                    other => storage(other),
                })?
                .ok_or(DirectoryError::not_found(EntityKind::Course, id))?;
            info!(event = "course_updated", course_id = id);
            Ok::<_, DirectoryError>(updated)
        })
        .await
    }

    /// Delete a course. Courses that still have enrollments are refused with
    /// `CourseInUse`.
    #[instrument(skip(self))]
    pub async fn delete_course(&self, id: i32) -> Result<(), DirectoryError> {
        observed("delete_course", async {
            self.require_course(id).await?;
            let enrollments = self.repo.count_enrollments_for_course(id).await.map_err(storage)?;
            if enrollments > 0 {
                debug!(course_id = id, enrollments, "course still referenced");
                return Err(DirectoryError::CourseInUse { course_id: id, enrollments });
            }
            match self.repo.delete_course(id).await {
                Ok(true) => {}
                Ok(false) => return Err(DirectoryError::not_found(EntityKind::Course, id)),
                Err(StoreError::ForeignKeyViolation(_)) => {
                    // enrolled into between the count and the delete
                    let enrollments = self.repo.count_enrollments_for_course(id).await.map_err(storage)?;
                    return Err(DirectoryError::CourseInUse { course_id: id, enrollments: enrollments.max(1) });
                }
                Err(other) => return Err(storage(other)),
            }
            info!(event = "course_deleted", course_id = id);
            Ok::<_, DirectoryError>(())
        })
        .await
    }

    /// Enroll a student in a course.
    ///
    /// # Examples
    /// ```
    /// use service::directory::{DirectoryService, domain::{NewCourse, NewStudent}, repository::memory::InMemoryDirectoryRepository};
    /// use std::sync::Arc;
    /// let svc = DirectoryService::new(Arc::new(InMemoryDirectoryRepository::default()));
    /// let s = tokio_test::block_on(svc.create_student(NewStudent::new("S1001", "John", None))).unwrap();
    /// let c = tokio_test::block_on(svc.create_course(NewCourse::new("MA101", "Mathematics", None))).unwrap();
    /// let e = tokio_test::block_on(svc.enroll(s.id, c.id)).unwrap();
    /// assert_eq!((e.student_id, e.course_id), (s.id, c.id));
    /// ```
    #[instrument(skip(self))]
    pub async fn enroll(&self, student_id: i32, course_id: i32) -> Result<enrollment::Model, DirectoryError> {
        observed("enroll", async {
            self.require_pair(student_id, course_id).await?;
            let created = match self.repo.insert_enrollment(student_id, course_id).await {
                Ok(created) => created,
                Err(StoreError::UniqueViolation(_)) => {
                    return Err(DirectoryError::AlreadyEnrolled { student_id, course_id })
                }
                Err(StoreError::ForeignKeyViolation(detail)) => {
                    // student or course deleted after the reference check
                    self.require_pair(student_id, course_id).await?;
                    return Err(storage(StoreError::ForeignKeyViolation(detail)));
                }
                Err(other) => return Err(storage(other)),
            };
            info!(event = "student_enrolled", enrollment_id = created.id, student_id, course_id);
            Ok::<_, DirectoryError>(created)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn unenroll(&self, student_id: i32, course_id: i32) -> Result<(), DirectoryError> {
        observed("unenroll", async {
            self.require_pair(student_id, course_id).await?;
            let found = self
                .repo
                .find_enrollment(student_id, course_id)
                .await
                .map_err(storage)?
                .ok_or(DirectoryError::EnrollmentNotFound { student_id, course_id })?;
            if !self.repo.delete_enrollment(found.id).await.map_err(storage)? {
                return Err(DirectoryError::EnrollmentNotFound { student_id, course_id });
            }
            info!(event = "student_unenrolled", enrollment_id = found.id, student_id, course_id);
            Ok::<_, DirectoryError>(())
        })
        .await
    }

    /// Enrollment rows of a student ordered by id; an empty list is a success.
    #[instrument(skip(self))]
    pub async fn list_enrollments_for_student(&self, student_id: i32) -> Result<Vec<enrollment::Model>, DirectoryError> {
        observed("list_enrollments_for_student", async {
            if self.repo.get_student(student_id).await.map_err(storage)?.is_none() {
                return Err(DirectoryError::StudentNotFound(student_id));
            }
            self.repo.list_enrollments_for_student(student_id).await.map_err(storage)
        })
        .await
    }

    /// A student and the courses it is enrolled in, in enrollment order.
    #[instrument(skip(self))]
    pub async fn student_details(&self, student_id: i32) -> Result<StudentDetails, DirectoryError> {
        observed("student_details", async {
            let student = self
                .repo
                .get_student(student_id)
                .await
                .map_err(storage)?
                .ok_or(DirectoryError::StudentNotFound(student_id))?;
            let enrollments = self.repo.list_enrollments_for_student(student_id).await.map_err(storage)?;
            let mut courses = Vec::with_capacity(enrollments.len());
            for e in enrollments {
                match self.repo.get_course(e.course_id).await.map_err(storage)? {
                    Some(c) => courses.push(c),
                    None => warn!(enrollment_id = e.id, course_id = e.course_id, "enrollment references a missing course"),
                }
            }
            Ok::<_, DirectoryError>(StudentDetails { student, courses })
        })
        .await
    }

    /// Insert the demo courses, students and enrollments. Rows whose unique
    /// key already exists are reused, so running it twice creates nothing new.
    #[instrument(skip(self))]
    pub async fn seed_demo_data(&self) -> Result<SeedReport, DirectoryError> {
        const COURSES: [(&str, &str, &str); 2] = [
            ("MA101", "Mathematics", "Introduction to Mathematics"),
            ("PH101", "Physics", "Introduction to Physics"),
        ];
        const STUDENTS: [(&str, &str, &str); 2] = [("S1001", "John", "Doe"), ("S1002", "Jane", "Smith")];
        const ENROLLMENTS: [(&str, &str); 2] = [("S1001", "MA101"), ("S1002", "PH101")];

        observed("seed_demo_data", async {
            let mut report = SeedReport::default();
            for (code, name, description) in COURSES {
                if self.repo.find_course_by_code(code).await.map_err(storage)?.is_none() {
                    self.repo.insert_course(&NewCourse::new(code, name, Some(description))).await.map_err(storage)?;
                    report.courses_created += 1;
                }
            }
            for (roll, first, last) in STUDENTS {
                if self.repo.find_student_by_roll_number(roll).await.map_err(storage)?.is_none() {
                    self.repo.insert_student(&NewStudent::new(roll, first, Some(last))).await.map_err(storage)?;
                    report.students_created += 1;
                }
            }
            for (roll, code) in ENROLLMENTS {
                let (Some(s), Some(c)) = (
                    self.repo.find_student_by_roll_number(roll).await.map_err(storage)?,
                    self.repo.find_course_by_code(code).await.map_err(storage)?,
                ) else {
                    continue;
                };
                if self.repo.find_enrollment(s.id, c.id).await.map_err(storage)?.is_none() {
                    self.repo.insert_enrollment(s.id, c.id).await.map_err(storage)?;
                    report.enrollments_created += 1;
                }
            }
            info!(
                event = "demo_data_seeded",
                students = report.students_created,
                courses = report.courses_created,
                enrollments = report.enrollments_created
            );
            Ok::<_, DirectoryError>(report)
        })
        .await
    }
}
