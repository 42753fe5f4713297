use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use birimza_auth_types::identity::Identity;
use birimza_domain::homework::HomeworkStatus;
use birimza_domain::role::Role;

use crate::domain::types::HomeworkListing;
use crate::error::PortalError;
use crate::handlers::{CreatedResponse, STAFF, require_role};
use crate::state::AppState;
use crate::usecase::homework::{
    AddHomeworkInput, AddHomeworkUseCase, ListHomeworksUseCase, ReviewHomeworkInput,
    ReviewHomeworkUseCase,
};

#[derive(Serialize)]
pub struct HomeworkResponse {
    pub id: i32,
    pub student_id: i32,
    pub student_name: Option<String>,
    pub parent_name: Option<String>,
    pub subject: String,
    pub image_path: Option<String>,
    pub status: HomeworkStatus,
    pub teacher_note: Option<String>,
    #[serde(serialize_with = "birimza_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "birimza_core::serde::to_rfc3339_ms_opt")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<HomeworkListing> for HomeworkResponse {
    fn from(h: HomeworkListing) -> Self {
        Self {
            id: h.id,
            student_id: h.student_id,
            student_name: h.student_name,
            parent_name: h.parent_name,
            subject: h.subject,
            image_path: h.image_path,
            status: h.status,
            teacher_note: h.teacher_note,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

// ── GET /homeworks ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListHomeworksQuery {
    pub status: Option<String>,
}

pub async fn list_homeworks(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<ListHomeworksQuery>,
) -> Result<Json<Vec<HomeworkResponse>>, PortalError> {
    require_role(&identity, STAFF)?;
    let usecase = ListHomeworksUseCase {
        homeworks: state.homework_repo(),
    };
    let homeworks = usecase.execute(query.status.as_deref()).await?;
    Ok(Json(homeworks.into_iter().map(HomeworkResponse::from).collect()))
}

// ── POST /homeworks ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddHomeworkRequest {
    pub student_id: i32,
    pub subject: String,
    pub image_path: Option<String>,
}

pub async fn add_homework(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<AddHomeworkRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), PortalError> {
    require_role(&identity, STAFF)?;
    let usecase = AddHomeworkUseCase {
        homeworks: state.homework_repo(),
        students: state.student_repo(),
    };
    let homework = usecase
        .execute(AddHomeworkInput {
            student_id: body.student_id,
            subject: body.subject,
            image_path: body.image_path,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: homework.id })))
}

// ── POST /api/review_homework ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReviewHomeworkRequest {
    pub homework_id: i32,
    pub status: String,
    pub teacher_note: Option<String>,
}

#[derive(Serialize)]
pub struct ReviewHomeworkResponse {
    pub homework_id: i32,
    pub status: HomeworkStatus,
}

pub async fn review_homework(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<ReviewHomeworkRequest>,
) -> Result<Json<ReviewHomeworkResponse>, PortalError> {
    require_role(&identity, &[Role::Teacher])?;
    let usecase = ReviewHomeworkUseCase {
        homeworks: state.homework_repo(),
    };
    let status = usecase
        .execute(ReviewHomeworkInput {
            homework_id: body.homework_id,
            status: body.status,
            note: body.teacher_note,
            reviewer_id: identity.account_id,
        })
        .await?;
    Ok(Json(ReviewHomeworkResponse {
        homework_id: body.homework_id,
        status,
    }))
}
