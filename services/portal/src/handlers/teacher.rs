use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use birimza_auth_types::identity::Identity;
use birimza_domain::role::Role;

use crate::error::PortalError;
use crate::handlers::{CreatedResponse, require_role};
use crate::state::AppState;
use crate::usecase::staff::{AddTeacherInput, AddTeacherUseCase, ListTeachersUseCase};

#[derive(Serialize)]
pub struct TeacherResponse {
    pub id: i32,
    pub full_name: String,
    pub username: String,
    #[serde(serialize_with = "birimza_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn list_teachers(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherResponse>>, PortalError> {
    require_role(&identity, &[Role::Admin])?;
    let usecase = ListTeachersUseCase {
        staff: state.staff_repo(),
    };
    let teachers = usecase.execute().await?;
    Ok(Json(
        teachers
            .into_iter()
            .map(|t| TeacherResponse {
                id: t.id,
                full_name: t.full_name,
                username: t.username,
                created_at: t.created_at,
            })
            .collect(),
    ))
}

#[derive(Deserialize)]
pub struct AddTeacherRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
}

pub async fn add_teacher(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<AddTeacherRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), PortalError> {
    require_role(&identity, &[Role::Admin])?;
    let usecase = AddTeacherUseCase {
        staff: state.staff_repo(),
        hasher: state.hasher.clone(),
    };
    let teacher = usecase
        .execute(AddTeacherInput {
            full_name: body.full_name,
            username: body.username,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: teacher.id })))
}
