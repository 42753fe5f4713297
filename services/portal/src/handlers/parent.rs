use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use birimza_auth_types::identity::Identity;
use birimza_domain::role::Role;

use crate::error::PortalError;
use crate::handlers::homework::HomeworkResponse;
use crate::handlers::require_role;
use crate::state::AppState;
use crate::usecase::homework::ListParentHomeworksUseCase;
use crate::usecase::login::{ParentLoginInput, ParentLoginUseCase};
use crate::usecase::otp::{IssueOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};
use crate::usecase::registration::{RegisterParentInput, RegisterParentUseCase};

// ── POST /api/parents ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterParentRequest {
    pub name: String,
    pub phone: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterParentResponse {
    pub parent_id: i32,
}

pub async fn register_parent(
    State(state): State<AppState>,
    Json(body): Json<RegisterParentRequest>,
) -> Result<(StatusCode, Json<RegisterParentResponse>), PortalError> {
    let usecase = RegisterParentUseCase {
        parents: state.parent_repo(),
        hasher: state.hasher.clone(),
    };
    let parent_id = usecase
        .execute(RegisterParentInput {
            name: body.name,
            phone: body.phone,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(RegisterParentResponse { parent_id })))
}

// ── POST /api/parents/{id}/otp ────────────────────────────────────────────────

pub async fn resend_otp(
    State(state): State<AppState>,
    Path(parent_id): Path<i32>,
) -> Result<StatusCode, PortalError> {
    let usecase = IssueOtpUseCase {
        parents: state.parent_repo(),
        codes: state.otp_repo(),
    };
    usecase.execute(parent_id).await?;
    Ok(StatusCode::CREATED)
}

// ── POST /api/parents/{id}/verify ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub code: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Path(parent_id): Path<i32>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<StatusCode, PortalError> {
    let usecase = VerifyOtpUseCase {
        parents: state.parent_repo(),
        codes: state.otp_repo(),
    };
    usecase
        .execute(VerifyOtpInput {
            parent_id,
            code: body.code,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /api/parents/login ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ParentLoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct ParentLoginResponse {
    pub parent_id: i32,
    pub name: String,
    pub token: String,
    pub expires_at: u64,
}

pub async fn login_parent(
    State(state): State<AppState>,
    Json(body): Json<ParentLoginRequest>,
) -> Result<Json<ParentLoginResponse>, PortalError> {
    let usecase = ParentLoginUseCase {
        parents: state.parent_repo(),
        hasher: state.hasher.clone(),
        jwt_secret: state.secret(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let out = usecase
        .execute(ParentLoginInput {
            phone: body.phone,
            password: body.password,
        })
        .await?;
    Ok(Json(ParentLoginResponse {
        parent_id: out.parent.id,
        name: out.parent.name,
        token: out.token.token,
        expires_at: out.token.expires_at,
    }))
}

// ── GET /api/parents/me/homeworks ─────────────────────────────────────────────

pub async fn my_homeworks(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<HomeworkResponse>>, PortalError> {
    require_role(&identity, &[Role::Parent])?;
    let usecase = ListParentHomeworksUseCase {
        homeworks: state.homework_repo(),
    };
    let homeworks = usecase.execute(identity.account_id).await?;
    Ok(Json(homeworks.into_iter().map(HomeworkResponse::from).collect()))
}
