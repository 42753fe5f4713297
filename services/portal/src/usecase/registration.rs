use chrono::Utc;
use tracing::info;

use crate::domain::repository::{CredentialHasher, ParentRepository};
use crate::domain::types::{NewParent, validate_phone};
use crate::error::PortalError;
use crate::usecase::otp::draft_code;

pub struct RegisterParentInput {
    pub name: String,
    pub phone: String,
    pub password: String,
}

pub struct RegisterParentUseCase<P, H>
where
    P: ParentRepository,
    H: CredentialHasher,
{
    pub parents: P,
    pub hasher: H,
}

impl<P, H> RegisterParentUseCase<P, H>
where
    P: ParentRepository,
    H: CredentialHasher,
{
    /// Create an unverified parent and issue the first verification code.
    /// Returns the new parent id.
    ///
    /// The parent row and its first code are written together, so a failed
    /// registration leaves the phone free for a retry.
    pub async fn execute(&self, input: RegisterParentInput) -> Result<i32, PortalError> {
        let name = input.name.trim();
        let phone = input.phone.trim();
        if name.is_empty() || phone.is_empty() || input.password.is_empty() {
            return Err(PortalError::MissingData);
        }
        if !validate_phone(phone) {
            return Err(PortalError::InvalidPhone);
        }
        if self.parents.find_by_phone(phone).await?.is_some() {
            return Err(PortalError::PhoneAlreadyRegistered);
        }

        let now = Utc::now();
        let (parent, code) = self
            .parents
            .create_with_code(
                &NewParent {
                    name: name.to_owned(),
                    phone: phone.to_owned(),
                    credential_hash: self.hasher.hash(&input.password)?,
                    created_at: now,
                },
                &draft_code(now),
            )
            .await?;
        info!(parent_id = parent.id, code_id = code.id, "parent registered");
        Ok(parent.id)
    }
}
