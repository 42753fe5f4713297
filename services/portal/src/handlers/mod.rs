use serde::Serialize;

use birimza_auth_types::identity::Identity;
use birimza_domain::role::Role;

use crate::error::PortalError;

pub mod dashboard;
pub mod health;
pub mod homework;
pub mod parent;
pub mod session;
pub mod student;
pub mod teacher;

/// Capability check run at the start of every protected handler.
pub fn require_role(identity: &Identity, allowed: &[Role]) -> Result<(), PortalError> {
    if identity.has_any_role(allowed) {
        Ok(())
    } else {
        Err(PortalError::Forbidden)
    }
}

pub const STAFF: &[Role] = &[Role::Teacher, Role::Admin];

/// Body of a 201 for endpoints that create one row.
#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i32,
}
