#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use birimza_domain::homework::{HomeworkStatus, StatusFilter};
use birimza_domain::role::Role;

use crate::domain::types::{
    CodeDraft, Homework, HomeworkListing, NewHomework, NewOtpCode, NewParent, NewStaffUser,
    NewStudent, OtpCode, OtpMessage, OutboxEvent, Parent, Review, StaffUser, Student,
    StudentListing,
};
use crate::error::PortalError;

/// Repository for parent accounts.
pub trait ParentRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Parent>, PortalError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Parent>, PortalError>;

    /// Insert an unverified parent, its first code and the code's
    /// `otp_issued` outbox event in one transaction. Nothing is kept when any
    /// write fails. A taken phone yields `PhoneAlreadyRegistered`.
    async fn create_with_code(
        &self,
        parent: &NewParent,
        code: &CodeDraft,
    ) -> Result<(Parent, OtpCode), PortalError>;

    async fn count(&self) -> Result<u64, PortalError>;
}

/// Repository for one-time verification codes.
pub trait OtpCodeRepository: Send + Sync {
    /// Insert a code and its `otp_issued` outbox event atomically (same transaction).
    async fn create_with_outbox(
        &self,
        code: &NewOtpCode,
        message: &OtpMessage,
    ) -> Result<OtpCode, PortalError>;

    /// Most recently issued unused code for this parent with this value,
    /// expired or not.
    async fn find_latest_unused(
        &self,
        parent_id: i32,
        code: &str,
    ) -> Result<Option<OtpCode>, PortalError>;

    /// Mark the code used and the parent verified in one transaction.
    ///
    /// The update is conditional on the code still being unused; returns
    /// `false` when another caller consumed it first.
    async fn consume(
        &self,
        code_id: i32,
        parent_id: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, PortalError>;
}

/// Repository for teacher and admin accounts.
pub trait StaffRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<StaffUser>, PortalError>;

    /// Insert a staff user. A taken username yields `UsernameAlreadyTaken`.
    async fn create(&self, user: &NewStaffUser) -> Result<StaffUser, PortalError>;

    /// Newest first.
    async fn list_by_role(&self, role: Role) -> Result<Vec<StaffUser>, PortalError>;
}

pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, PortalError>;

    async fn create(&self, student: &NewStudent) -> Result<Student, PortalError>;

    /// Newest first, joined with the parent's name.
    async fn list(&self) -> Result<Vec<StudentListing>, PortalError>;

    async fn count(&self) -> Result<u64, PortalError>;
}

pub trait HomeworkRepository: Send + Sync {
    async fn create(&self, homework: &NewHomework) -> Result<Homework, PortalError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Homework>, PortalError>;

    /// Apply a review only if the homework is still pending.
    /// Returns `false` when no pending row matched.
    async fn review(&self, review: &Review) -> Result<bool, PortalError>;

    /// Newest first. `limit = None` returns every matching row.
    async fn list(
        &self,
        filter: StatusFilter,
        limit: Option<u64>,
    ) -> Result<Vec<HomeworkListing>, PortalError>;

    async fn list_by_parent(&self, parent_id: i32) -> Result<Vec<HomeworkListing>, PortalError>;

    async fn count_by_status(&self, status: HomeworkStatus) -> Result<u64, PortalError>;
}

/// Outbox rows read and updated by the relay.
pub trait OutboxRepository: Send + Sync {
    /// Unprocessed, unfailed events whose `next_attempt_at` has passed.
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<OutboxEvent>, PortalError>;

    async fn mark_processed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PortalError>;

    async fn schedule_retry(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), PortalError>;

    async fn mark_failed(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        at: DateTime<Utc>,
    ) -> Result<(), PortalError>;
}

/// One-way credential hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, PortalError>;

    /// `false` for a mismatch and for an unparseable stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Sends an issued code to the parent's phone.
pub trait DeliveryHook: Send + Sync {
    async fn deliver(&self, message: &OtpMessage) -> anyhow::Result<()>;
}
