use std::sync::Arc;

use tracing::info;

use birimza_auth_types::token::{IssuedToken, issue_token};
use birimza_domain::role::Role;

use crate::domain::repository::{CredentialHasher, ParentRepository, StaffRepository};
use crate::domain::types::{Parent, StaffUser};
use crate::error::PortalError;

fn sign(
    account_id: i32,
    role: Role,
    secret: &str,
    ttl_secs: u64,
) -> Result<IssuedToken, PortalError> {
    issue_token(account_id, role, secret, ttl_secs).map_err(PortalError::internal)
}

// ── ParentLogin ───────────────────────────────────────────────────────────────

pub struct ParentLoginInput {
    pub phone: String,
    pub password: String,
}

pub struct ParentLoginOutput {
    pub parent: Parent,
    pub token: IssuedToken,
}

pub struct ParentLoginUseCase<P, H>
where
    P: ParentRepository,
    H: CredentialHasher,
{
    pub parents: P,
    pub hasher: H,
    pub jwt_secret: Arc<str>,
    pub token_ttl_secs: u64,
}

impl<P, H> ParentLoginUseCase<P, H>
where
    P: ParentRepository,
    H: CredentialHasher,
{
    /// Checks run in a fixed order: unknown phone, wrong password, unverified.
    pub async fn execute(&self, input: ParentLoginInput) -> Result<ParentLoginOutput, PortalError> {
        let parent = self
            .parents
            .find_by_phone(input.phone.trim())
            .await?
            .ok_or(PortalError::ParentNotFound)?;

        if !self.hasher.verify(&input.password, &parent.credential_hash) {
            return Err(PortalError::InvalidCredential);
        }
        if !parent.verified {
            return Err(PortalError::Unverified);
        }

        let token = sign(parent.id, Role::Parent, &self.jwt_secret, self.token_ttl_secs)?;
        info!(parent_id = parent.id, "parent logged in");
        Ok(ParentLoginOutput { parent, token })
    }
}

// ── StaffLogin ────────────────────────────────────────────────────────────────

pub struct StaffLoginInput {
    pub username: String,
    pub password: String,
    /// Restrict the login to one role (the teacher mobile API).
    pub required_role: Option<Role>,
}

pub struct StaffLoginOutput {
    pub user: StaffUser,
    pub token: IssuedToken,
}

pub struct StaffLoginUseCase<S, H>
where
    S: StaffRepository,
    H: CredentialHasher,
{
    pub staff: S,
    pub hasher: H,
    pub jwt_secret: Arc<str>,
    pub token_ttl_secs: u64,
}

impl<S, H> StaffLoginUseCase<S, H>
where
    S: StaffRepository,
    H: CredentialHasher,
{
    pub async fn execute(&self, input: StaffLoginInput) -> Result<StaffLoginOutput, PortalError> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() {
            return Err(PortalError::MissingData);
        }

        let user = self
            .staff
            .find_by_username(username)
            .await?
            .filter(|user| input.required_role.is_none_or(|role| user.role == role))
            .ok_or(PortalError::StaffNotFound)?;

        if !self.hasher.verify(&input.password, &user.credential_hash) {
            return Err(PortalError::InvalidCredential);
        }

        let token = sign(user.id, user.role, &self.jwt_secret, self.token_ttl_secs)?;
        info!(staff_id = user.id, role = user.role.as_str(), "staff logged in");
        Ok(StaffLoginOutput { user, token })
    }
}
