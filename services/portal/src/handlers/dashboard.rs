use axum::{Json, extract::State};
use serde::Serialize;

use birimza_auth_types::identity::Identity;

use crate::error::PortalError;
use crate::handlers::homework::HomeworkResponse;
use crate::handlers::{STAFF, require_role};
use crate::state::AppState;
use crate::usecase::dashboard::DashboardUseCase;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub total_students: u64,
    pub total_parents: u64,
    pub pending_homeworks: u64,
    pub recent_homeworks: Vec<HomeworkResponse>,
}

pub async fn dashboard(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, PortalError> {
    require_role(&identity, STAFF)?;
    let usecase = DashboardUseCase {
        students: state.student_repo(),
        parents: state.parent_repo(),
        homeworks: state.homework_repo(),
    };
    let summary = usecase.execute().await?;
    Ok(Json(DashboardResponse {
        total_students: summary.total_students,
        total_parents: summary.total_parents,
        pending_homeworks: summary.pending_homeworks,
        recent_homeworks: summary
            .recent
            .into_iter()
            .map(HomeworkResponse::from)
            .collect(),
    }))
}
