use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use birimza_auth_types::identity::Identity;

use crate::error::PortalError;
use crate::handlers::{CreatedResponse, STAFF, require_role};
use crate::state::AppState;
use crate::usecase::student::{AddStudentInput, AddStudentUseCase, ListStudentsUseCase};

#[derive(Serialize)]
pub struct StudentResponse {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub parent_name: Option<String>,
    #[serde(serialize_with = "birimza_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn list_students(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, PortalError> {
    require_role(&identity, STAFF)?;
    let usecase = ListStudentsUseCase {
        students: state.student_repo(),
    };
    let students = usecase.execute().await?;
    Ok(Json(
        students
            .into_iter()
            .map(|s| StudentResponse {
                id: s.id,
                name: s.name,
                parent_id: s.parent_id,
                parent_name: s.parent_name,
                created_at: s.created_at,
            })
            .collect(),
    ))
}

#[derive(Deserialize)]
pub struct AddStudentRequest {
    pub name: String,
    pub parent_id: Option<i32>,
}

pub async fn add_student(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<AddStudentRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), PortalError> {
    require_role(&identity, STAFF)?;
    let usecase = AddStudentUseCase {
        students: state.student_repo(),
        parents: state.parent_repo(),
    };
    let student = usecase
        .execute(AddStudentInput {
            name: body.name,
            parent_id: body.parent_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: student.id })))
}
