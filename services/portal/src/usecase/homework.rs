use chrono::Utc;
use tracing::info;

use birimza_domain::homework::{HomeworkStatus, StatusFilter};

use crate::domain::repository::{HomeworkRepository, StudentRepository};
use crate::domain::types::{Homework, HomeworkListing, NewHomework, Review};
use crate::error::PortalError;

// ── AddHomework ───────────────────────────────────────────────────────────────

pub struct AddHomeworkInput {
    pub student_id: i32,
    pub subject: String,
    pub image_path: Option<String>,
}

pub struct AddHomeworkUseCase<H, S>
where
    H: HomeworkRepository,
    S: StudentRepository,
{
    pub homeworks: H,
    pub students: S,
}

impl<H, S> AddHomeworkUseCase<H, S>
where
    H: HomeworkRepository,
    S: StudentRepository,
{
    pub async fn execute(&self, input: AddHomeworkInput) -> Result<Homework, PortalError> {
        let subject = input.subject.trim();
        if subject.is_empty() {
            return Err(PortalError::MissingData);
        }
        let student = self
            .students
            .find_by_id(input.student_id)
            .await?
            .ok_or(PortalError::StudentNotFound)?;
        let homework = self
            .homeworks
            .create(&NewHomework {
                student_id: student.id,
                parent_id: student.parent_id,
                subject: subject.to_owned(),
                image_path: input.image_path.filter(|p| !p.trim().is_empty()),
                created_at: Utc::now(),
            })
            .await?;
        info!(homework_id = homework.id, student_id = student.id, "homework recorded");
        Ok(homework)
    }
}

// ── ReviewHomework ────────────────────────────────────────────────────────────

pub struct ReviewHomeworkInput {
    pub homework_id: i32,
    pub status: String,
    pub note: Option<String>,
    pub reviewer_id: i32,
}

pub struct ReviewHomeworkUseCase<H: HomeworkRepository> {
    pub homeworks: H,
}

impl<H: HomeworkRepository> ReviewHomeworkUseCase<H> {
    pub async fn execute(&self, input: ReviewHomeworkInput) -> Result<HomeworkStatus, PortalError> {
        let status = input
            .status
            .parse::<HomeworkStatus>()
            .ok()
            .filter(|s| s.is_review_outcome())
            .ok_or(PortalError::InvalidStatus)?;

        let homework = self
            .homeworks
            .find_by_id(input.homework_id)
            .await?
            .ok_or(PortalError::HomeworkNotFound)?;
        if !homework.status.can_transition_to(status) {
            return Err(PortalError::HomeworkAlreadyReviewed);
        }

        let applied = self
            .homeworks
            .review(&Review {
                homework_id: homework.id,
                status,
                note: input.note.filter(|n| !n.trim().is_empty()),
                reviewer_id: input.reviewer_id,
                reviewed_at: Utc::now(),
            })
            .await?;
        // A concurrent review won between the read and the conditional update.
        if !applied {
            return Err(PortalError::HomeworkAlreadyReviewed);
        }

        info!(
            homework_id = homework.id,
            reviewer_id = input.reviewer_id,
            status = status.as_str(),
            "homework reviewed"
        );
        Ok(status)
    }
}

// ── ListHomeworks ─────────────────────────────────────────────────────────────

pub struct ListHomeworksUseCase<H: HomeworkRepository> {
    pub homeworks: H,
}

impl<H: HomeworkRepository> ListHomeworksUseCase<H> {
    /// `status` defaults to `pending`; `all` disables filtering.
    pub async fn execute(&self, status: Option<&str>) -> Result<Vec<HomeworkListing>, PortalError> {
        let filter = match status {
            None => StatusFilter::default(),
            Some(raw) => StatusFilter::parse(raw).map_err(|_| PortalError::InvalidStatus)?,
        };
        self.homeworks.list(filter, None).await
    }
}

// ── ListParentHomeworks ───────────────────────────────────────────────────────

pub struct ListParentHomeworksUseCase<H: HomeworkRepository> {
    pub homeworks: H,
}

impl<H: HomeworkRepository> ListParentHomeworksUseCase<H> {
    pub async fn execute(&self, parent_id: i32) -> Result<Vec<HomeworkListing>, PortalError> {
        self.homeworks.list_by_parent(parent_id).await
    }
}
