use birimza_domain::homework::{HomeworkStatus, StatusFilter};

use crate::domain::repository::{HomeworkRepository, ParentRepository, StudentRepository};
use crate::domain::types::{DashboardSummary, RECENT_HOMEWORK_LIMIT};
use crate::error::PortalError;

pub struct DashboardUseCase<S, P, H>
where
    S: StudentRepository,
    P: ParentRepository,
    H: HomeworkRepository,
{
    pub students: S,
    pub parents: P,
    pub homeworks: H,
}

impl<S, P, H> DashboardUseCase<S, P, H>
where
    S: StudentRepository,
    P: ParentRepository,
    H: HomeworkRepository,
{
    pub async fn execute(&self) -> Result<DashboardSummary, PortalError> {
        Ok(DashboardSummary {
            total_students: self.students.count().await?,
            total_parents: self.parents.count().await?,
            pending_homeworks: self
                .homeworks
                .count_by_status(HomeworkStatus::Pending)
                .await?,
            recent: self
                .homeworks
                .list(StatusFilter::All, Some(RECENT_HOMEWORK_LIMIT))
                .await?,
        })
    }
}
