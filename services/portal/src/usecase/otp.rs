use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use tracing::{info, warn};

use crate::domain::repository::{OtpCodeRepository, ParentRepository};
use crate::domain::types::{CodeDraft, OTP_LEN, OTP_TTL_SECS, OtpCode, OtpMessage, Parent};
use crate::error::PortalError;

/// Uniform over `000000..=999999`, zero-padded.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    format!("{:0width$}", rng.random_range(0..1_000_000u32), width = OTP_LEN)
}

/// Fresh code valid for `OTP_TTL_SECS` from `now`.
pub fn draft_code(now: DateTime<Utc>) -> CodeDraft {
    CodeDraft {
        code: generate_code(),
        expires_at: now + Duration::seconds(OTP_TTL_SECS),
        created_at: now,
    }
}

/// Persist a fresh code for `parent` together with its delivery event.
/// Earlier unused codes stay valid.
pub async fn issue_for<C: OtpCodeRepository>(
    codes: &C,
    parent: &Parent,
) -> Result<OtpCode, PortalError> {
    let new_code = draft_code(Utc::now()).for_parent(parent.id);
    let message = OtpMessage {
        parent_id: parent.id,
        phone: parent.phone.clone(),
        code: new_code.code.clone(),
    };
    let issued = codes.create_with_outbox(&new_code, &message).await?;
    info!(parent_id = parent.id, code_id = issued.id, "verification code issued");
    Ok(issued)
}

// ── IssueOtp ──────────────────────────────────────────────────────────────────

pub struct IssueOtpUseCase<P, C>
where
    P: ParentRepository,
    C: OtpCodeRepository,
{
    pub parents: P,
    pub codes: C,
}

impl<P, C> IssueOtpUseCase<P, C>
where
    P: ParentRepository,
    C: OtpCodeRepository,
{
    pub async fn execute(&self, parent_id: i32) -> Result<OtpCode, PortalError> {
        let parent = self
            .parents
            .find_by_id(parent_id)
            .await?
            .ok_or(PortalError::ParentNotFound)?;
        issue_for(&self.codes, &parent).await
    }
}

// ── VerifyOtp ─────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub parent_id: i32,
    pub code: String,
}

pub struct VerifyOtpUseCase<P, C>
where
    P: ParentRepository,
    C: OtpCodeRepository,
{
    pub parents: P,
    pub codes: C,
}

impl<P, C> VerifyOtpUseCase<P, C>
where
    P: ParentRepository,
    C: OtpCodeRepository,
{
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<(), PortalError> {
        let parent = self
            .parents
            .find_by_id(input.parent_id)
            .await?
            .ok_or(PortalError::ParentNotFound)?;

        let Some(code) = self
            .codes
            .find_latest_unused(parent.id, input.code.trim())
            .await?
        else {
            warn!(parent_id = parent.id, "verification rejected: no matching unused code");
            return Err(PortalError::InvalidCode);
        };

        let now = Utc::now();
        if code.is_expired_at(now) {
            warn!(
                parent_id = parent.id,
                code_id = code.id,
                "verification rejected: code expired"
            );
            return Err(PortalError::ExpiredCode);
        }

        if !self.codes.consume(code.id, parent.id, now).await? {
            warn!(
                parent_id = parent.id,
                code_id = code.id,
                "verification rejected: code already consumed"
            );
            return Err(PortalError::InvalidCode);
        }

        info!(parent_id = parent.id, code_id = code.id, "parent verified");
        Ok(())
    }
}
