use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use birimza_auth_types::cookie::{clear_session_cookie, set_session_cookie};
use birimza_auth_types::identity::Identity;
use birimza_domain::role::Role;

use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::login::{StaffLoginInput, StaffLoginUseCase};

#[derive(Deserialize)]
pub struct StaffLoginRequest {
    pub username: String,
    pub password: String,
}

// ── POST /auth/session ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub account_id: i32,
    pub full_name: String,
    pub role: Role,
    pub expires_at: u64,
}

pub async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<StaffLoginRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let usecase = StaffLoginUseCase {
        staff: state.staff_repo(),
        hasher: state.hasher.clone(),
        jwt_secret: state.secret(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let out = usecase
        .execute(StaffLoginInput {
            username: body.username,
            password: body.password,
            required_role: None,
        })
        .await?;

    let jar = set_session_cookie(jar, out.token.token, state.token_ttl_secs, &state.cookie);
    let body = SessionResponse {
        account_id: out.user.id,
        full_name: out.user.full_name,
        role: out.user.role,
        expires_at: out.token.expires_at,
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}

// ── DELETE /auth/session ──────────────────────────────────────────────────────

pub async fn delete_session(
    State(state): State<AppState>,
    _identity: Identity,
    jar: CookieJar,
) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, clear_session_cookie(jar, &state.cookie))
}

// ── POST /api/teacher_login ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TeacherLoginResponse {
    pub teacher_id: i32,
    pub full_name: String,
    pub username: String,
    pub token: String,
    pub expires_at: u64,
}

pub async fn teacher_login(
    State(state): State<AppState>,
    Json(body): Json<StaffLoginRequest>,
) -> Result<Json<TeacherLoginResponse>, PortalError> {
    let usecase = StaffLoginUseCase {
        staff: state.staff_repo(),
        hasher: state.hasher.clone(),
        jwt_secret: state.secret(),
        token_ttl_secs: state.token_ttl_secs,
    };
    let out = usecase
        .execute(StaffLoginInput {
            username: body.username,
            password: body.password,
            required_role: Some(Role::Teacher),
        })
        .await?;
    Ok(Json(TeacherLoginResponse {
        teacher_id: out.user.id,
        full_name: out.user.full_name,
        username: out.user.username,
        token: out.token.token,
        expires_at: out.token.expires_at,
    }))
}
