use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use birimza_auth_types::cookie::CookieSettings;
use birimza_auth_types::identity::TokenSecret;

use crate::infra::db::{
    DbHomeworkRepository, DbOtpCodeRepository, DbOutboxRepository, DbParentRepository,
    DbStaffRepository, DbStudentRepository,
};
use crate::infra::password::Argon2Hasher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: TokenSecret,
    pub cookie: CookieSettings,
    pub token_ttl_secs: u64,
    pub hasher: Argon2Hasher,
}

impl FromRef<AppState> for TokenSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl AppState {
    pub fn secret(&self) -> Arc<str> {
        Arc::clone(&self.jwt_secret.0)
    }

    pub fn parent_repo(&self) -> DbParentRepository {
        DbParentRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpCodeRepository {
        DbOtpCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn staff_repo(&self) -> DbStaffRepository {
        DbStaffRepository {
            db: self.db.clone(),
        }
    }

    pub fn student_repo(&self) -> DbStudentRepository {
        DbStudentRepository {
            db: self.db.clone(),
        }
    }

    pub fn homework_repo(&self) -> DbHomeworkRepository {
        DbHomeworkRepository {
            db: self.db.clone(),
        }
    }

    pub fn outbox_repo(&self) -> DbOutboxRepository {
        DbOutboxRepository {
            db: self.db.clone(),
        }
    }
}
