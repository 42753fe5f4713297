use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use birimza_domain::homework::HomeworkStatus;
use birimza_domain::role::Role;

/// Self-registered parent account.
#[derive(Debug, Clone)]
pub struct Parent {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub credential_hash: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewParent {
    pub name: String,
    pub phone: String,
    pub credential_hash: String,
    pub created_at: DateTime<Utc>,
}

/// One-time verification code issued to a parent.
#[derive(Debug, Clone)]
pub struct OtpCode {
    pub id: i32,
    pub parent_id: i32,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OtpCode {
    /// A code is still accepted at its exact deadline; expiry starts after it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Code value and validity window, not yet bound to a parent row.
#[derive(Debug, Clone)]
pub struct CodeDraft {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CodeDraft {
    pub fn for_parent(&self, parent_id: i32) -> NewOtpCode {
        NewOtpCode {
            parent_id,
            code: self.code.clone(),
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOtpCode {
    pub parent_id: i32,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// What the delivery hook needs to send one code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpMessage {
    pub parent_id: i32,
    pub phone: String,
    pub code: String,
}

/// Outbox event for async delivery (the OTP text message).
#[derive(Debug, Clone)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
    pub attempts: i32,
}

impl OutboxEvent {
    /// Event written next to the code row with id `code_id`.
    pub fn otp_issued(code_id: i32, message: &OtpMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: OTP_ISSUED_EVENT.to_owned(),
            payload: json!({
                "parent_id": message.parent_id,
                "phone": message.phone,
                "code": message.code,
            }),
            idempotency_key: format!("{OTP_ISSUED_EVENT}:{code_id}"),
            attempts: 0,
        }
    }
}

/// Teacher or admin account.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub id: i32,
    pub full_name: String,
    pub username: String,
    pub credential_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStaffUser {
    pub full_name: String,
    pub username: String,
    pub credential_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Student row joined with the linked parent's name.
#[derive(Debug, Clone)]
pub struct StudentListing {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub parent_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Homework {
    pub id: i32,
    pub student_id: i32,
    pub parent_id: Option<i32>,
    pub subject: String,
    pub image_path: Option<String>,
    pub status: HomeworkStatus,
    pub teacher_note: Option<String>,
    pub reviewed_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewHomework {
    pub student_id: i32,
    pub parent_id: Option<i32>,
    pub subject: String,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Homework row joined with student and parent names.
#[derive(Debug, Clone)]
pub struct HomeworkListing {
    pub id: i32,
    pub student_id: i32,
    pub student_name: Option<String>,
    pub parent_name: Option<String>,
    pub subject: String,
    pub image_path: Option<String>,
    pub status: HomeworkStatus,
    pub teacher_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A teacher's decision on one pending homework.
#[derive(Debug, Clone)]
pub struct Review {
    pub homework_id: i32,
    pub status: HomeworkStatus,
    pub note: Option<String>,
    pub reviewer_id: i32,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub total_students: u64,
    pub total_parents: u64,
    pub pending_homeworks: u64,
    pub recent: Vec<HomeworkListing>,
}

/// Phone numbers are digits, optionally prefixed by `+`, 10 to 15 digits long.
pub fn validate_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (10..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Outbox event kind for issued verification codes.
pub const OTP_ISSUED_EVENT: &str = "otp_issued";

/// OTP length in characters (zero-padded digits).
pub const OTP_LEN: usize = 6;

/// OTP time-to-live in seconds.
pub const OTP_TTL_SECS: i64 = 600;

/// Delivery attempts before an outbox event is marked failed.
pub const MAX_DELIVERY_ATTEMPTS: i32 = 5;

/// Linear backoff step between delivery attempts.
pub const RETRY_BACKOFF_SECS: i64 = 30;

/// Events fetched per relay tick.
pub const OUTBOX_BATCH_SIZE: u64 = 50;

/// Homework rows shown on the dashboard.
pub const RECENT_HOMEWORK_LIMIT: u64 = 10;
