use chrono::Utc;
use tracing::info;

use crate::domain::repository::{ParentRepository, StudentRepository};
use crate::domain::types::{NewStudent, Student, StudentListing};
use crate::error::PortalError;

pub struct AddStudentInput {
    pub name: String,
    pub parent_id: Option<i32>,
}

pub struct AddStudentUseCase<S, P>
where
    S: StudentRepository,
    P: ParentRepository,
{
    pub students: S,
    pub parents: P,
}

impl<S, P> AddStudentUseCase<S, P>
where
    S: StudentRepository,
    P: ParentRepository,
{
    pub async fn execute(&self, input: AddStudentInput) -> Result<Student, PortalError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PortalError::MissingData);
        }
        if let Some(parent_id) = input.parent_id {
            self.parents
                .find_by_id(parent_id)
                .await?
                .ok_or(PortalError::ParentNotFound)?;
        }
        let student = self
            .students
            .create(&NewStudent {
                name: name.to_owned(),
                parent_id: input.parent_id,
                created_at: Utc::now(),
            })
            .await?;
        info!(student_id = student.id, parent_id = ?student.parent_id, "student added");
        Ok(student)
    }
}

pub struct ListStudentsUseCase<S: StudentRepository> {
    pub students: S,
}

impl<S: StudentRepository> ListStudentsUseCase<S> {
    pub async fn execute(&self) -> Result<Vec<StudentListing>, PortalError> {
        self.students.list().await
    }
}
