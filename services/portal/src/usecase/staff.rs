use chrono::Utc;
use tracing::info;

use birimza_domain::role::Role;

use crate::domain::repository::{CredentialHasher, StaffRepository};
use crate::domain::types::{NewStaffUser, StaffUser};
use crate::error::PortalError;

// ── AddTeacher ────────────────────────────────────────────────────────────────

pub struct AddTeacherInput {
    pub full_name: String,
    pub username: String,
    pub password: String,
}

pub struct AddTeacherUseCase<S, H>
where
    S: StaffRepository,
    H: CredentialHasher,
{
    pub staff: S,
    pub hasher: H,
}

impl<S, H> AddTeacherUseCase<S, H>
where
    S: StaffRepository,
    H: CredentialHasher,
{
    pub async fn execute(&self, input: AddTeacherInput) -> Result<StaffUser, PortalError> {
        let full_name = input.full_name.trim();
        let username = input.username.trim();
        if full_name.is_empty() || username.is_empty() || input.password.is_empty() {
            return Err(PortalError::MissingData);
        }
        if self.staff.find_by_username(username).await?.is_some() {
            return Err(PortalError::UsernameAlreadyTaken);
        }
        let user = self
            .staff
            .create(&NewStaffUser {
                full_name: full_name.to_owned(),
                username: username.to_owned(),
                credential_hash: self.hasher.hash(&input.password)?,
                role: Role::Teacher,
                created_at: Utc::now(),
            })
            .await?;
        info!(staff_id = user.id, "teacher added");
        Ok(user)
    }
}

// ── ListTeachers ──────────────────────────────────────────────────────────────

pub struct ListTeachersUseCase<S: StaffRepository> {
    pub staff: S,
}

impl<S: StaffRepository> ListTeachersUseCase<S> {
    pub async fn execute(&self) -> Result<Vec<StaffUser>, PortalError> {
        self.staff.list_by_role(Role::Teacher).await
    }
}

// ── EnsureAdmin ───────────────────────────────────────────────────────────────

/// Startup bootstrap: create the admin account unless the username exists.
pub struct EnsureAdminUseCase<S, H>
where
    S: StaffRepository,
    H: CredentialHasher,
{
    pub staff: S,
    pub hasher: H,
}

impl<S, H> EnsureAdminUseCase<S, H>
where
    S: StaffRepository,
    H: CredentialHasher,
{
    /// Returns `true` when an account was created.
    pub async fn execute(&self, username: &str, password: &str) -> Result<bool, PortalError> {
        if self.staff.find_by_username(username).await?.is_some() {
            return Ok(false);
        }
        let created = self
            .staff
            .create(&NewStaffUser {
                full_name: "Administrator".to_owned(),
                username: username.to_owned(),
                credential_hash: self.hasher.hash(password)?,
                role: Role::Admin,
                created_at: Utc::now(),
            })
            .await;
        match created {
            Ok(user) => {
                info!(staff_id = user.id, username, "admin account created");
                Ok(true)
            }
            // Another replica created it first.
            Err(PortalError::UsernameAlreadyTaken) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
