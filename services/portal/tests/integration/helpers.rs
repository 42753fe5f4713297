use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use birimza_domain::homework::{HomeworkStatus, StatusFilter};
use birimza_domain::role::Role;
use birimza_portal::domain::repository::{
    CredentialHasher, DeliveryHook, HomeworkRepository, OtpCodeRepository, OutboxRepository,
    ParentRepository, StaffRepository, StudentRepository,
};
use birimza_portal::domain::types::{
    CodeDraft, Homework, HomeworkListing, NewHomework, NewOtpCode, NewParent, NewStaffUser,
    NewStudent, OTP_TTL_SECS, OtpCode, OtpMessage, OutboxEvent, Parent, Review, StaffUser,
    Student, StudentListing,
};
use birimza_portal::error::PortalError;

pub use birimza_testing::auth::TEST_JWT_SECRET;

// ── PlainHasher ──────────────────────────────────────────────────────────────

/// Reversible stand-in for argon2 so fixtures stay readable.
#[derive(Clone, Default)]
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, PortalError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(password)
    }
}

// ── MockParentRepo ───────────────────────────────────────────────────────────

/// Owns the code and message lists too, so registration can write a parent
/// and its first code as one unit.
#[derive(Clone)]
pub struct MockParentRepo {
    pub parents: Arc<Mutex<Vec<Parent>>>,
    pub codes: Arc<Mutex<Vec<OtpCode>>>,
    pub messages: Arc<Mutex<Vec<OtpMessage>>>,
    pub fail_code_writes: bool,
}

impl MockParentRepo {
    pub fn new(parents: Vec<Parent>) -> Self {
        Self {
            parents: Arc::new(Mutex::new(parents)),
            codes: Arc::new(Mutex::new(vec![])),
            messages: Arc::new(Mutex::new(vec![])),
            fail_code_writes: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Registration fails while writing the code; the parent is rolled back.
    pub fn failing_code_writes(self) -> Self {
        Self {
            fail_code_writes: true,
            ..self
        }
    }

    pub fn parents_handle(&self) -> Arc<Mutex<Vec<Parent>>> {
        Arc::clone(&self.parents)
    }

    pub fn codes_handle(&self) -> Arc<Mutex<Vec<OtpCode>>> {
        Arc::clone(&self.codes)
    }

    pub fn messages_handle(&self) -> Arc<Mutex<Vec<OtpMessage>>> {
        Arc::clone(&self.messages)
    }
}

impl ParentRepository for MockParentRepo {
    async fn find_by_id(&self, id: i32) -> Result<Option<Parent>, PortalError> {
        Ok(self.parents.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Parent>, PortalError> {
        Ok(self
            .parents
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.phone == phone)
            .cloned())
    }

    async fn create_with_code(
        &self,
        parent: &NewParent,
        code: &CodeDraft,
    ) -> Result<(Parent, OtpCode), PortalError> {
        let mut parents = self.parents.lock().unwrap();
        if parents.iter().any(|p| p.phone == parent.phone) {
            return Err(PortalError::PhoneAlreadyRegistered);
        }
        if self.fail_code_writes {
            return Err(anyhow::anyhow!("database unreachable").into());
        }
        let created = Parent {
            id: parents.len() as i32 + 1,
            name: parent.name.clone(),
            phone: parent.phone.clone(),
            credential_hash: parent.credential_hash.clone(),
            verified: false,
            created_at: parent.created_at,
        };
        let mut codes = self.codes.lock().unwrap();
        let issued = OtpCode {
            id: codes.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            parent_id: created.id,
            code: code.code.clone(),
            expires_at: code.expires_at,
            used: false,
            used_at: None,
            created_at: code.created_at,
        };
        parents.push(created.clone());
        codes.push(issued.clone());
        self.messages.lock().unwrap().push(OtpMessage {
            parent_id: created.id,
            phone: created.phone.clone(),
            code: issued.code.clone(),
        });
        Ok((created, issued))
    }

    async fn count(&self) -> Result<u64, PortalError> {
        Ok(self.parents.lock().unwrap().len() as u64)
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

/// Shares every list with a [`MockParentRepo`] so `consume` can flip the
/// verified flag like the real transaction does.
pub struct MockOtpRepo {
    pub codes: Arc<Mutex<Vec<OtpCode>>>,
    pub messages: Arc<Mutex<Vec<OtpMessage>>>,
    pub parents: Arc<Mutex<Vec<Parent>>>,
}

impl MockOtpRepo {
    pub fn for_parents(parents: &MockParentRepo) -> Self {
        Self {
            codes: parents.codes_handle(),
            messages: parents.messages_handle(),
            parents: parents.parents_handle(),
        }
    }

    pub fn with_codes(self, codes: Vec<OtpCode>) -> Self {
        *self.codes.lock().unwrap() = codes;
        self
    }

    pub fn codes_handle(&self) -> Arc<Mutex<Vec<OtpCode>>> {
        Arc::clone(&self.codes)
    }

    pub fn messages_handle(&self) -> Arc<Mutex<Vec<OtpMessage>>> {
        Arc::clone(&self.messages)
    }
}

impl OtpCodeRepository for MockOtpRepo {
    async fn create_with_outbox(
        &self,
        code: &NewOtpCode,
        message: &OtpMessage,
    ) -> Result<OtpCode, PortalError> {
        let mut codes = self.codes.lock().unwrap();
        let created = OtpCode {
            id: codes.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            parent_id: code.parent_id,
            code: code.code.clone(),
            expires_at: code.expires_at,
            used: false,
            used_at: None,
            created_at: code.created_at,
        };
        codes.push(created.clone());
        self.messages.lock().unwrap().push(message.clone());
        Ok(created)
    }

    async fn find_latest_unused(
        &self,
        parent_id: i32,
        code: &str,
    ) -> Result<Option<OtpCode>, PortalError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.parent_id == parent_id && c.code == code && !c.used)
            .max_by_key(|c| (c.created_at, c.id))
            .cloned())
    }

    async fn consume(
        &self,
        code_id: i32,
        parent_id: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, PortalError> {
        let mut codes = self.codes.lock().unwrap();
        let Some(code) = codes
            .iter_mut()
            .find(|c| c.id == code_id && c.parent_id == parent_id && !c.used)
        else {
            return Ok(false);
        };
        code.used = true;
        code.used_at = Some(at);
        if let Some(parent) = self
            .parents
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.id == parent_id)
        {
            parent.verified = true;
        }
        Ok(true)
    }
}

// ── MockStaffRepo ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockStaffRepo {
    pub users: Arc<Mutex<Vec<StaffUser>>>,
}

impl MockStaffRepo {
    pub fn new(users: Vec<StaffUser>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn users_handle(&self) -> Arc<Mutex<Vec<StaffUser>>> {
        Arc::clone(&self.users)
    }
}

impl StaffRepository for MockStaffRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<StaffUser>, PortalError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: &NewStaffUser) -> Result<StaffUser, PortalError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(PortalError::UsernameAlreadyTaken);
        }
        let created = StaffUser {
            id: users.len() as i32 + 1,
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            credential_hash: user.credential_hash.clone(),
            role: user.role,
            created_at: user.created_at,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<StaffUser>, PortalError> {
        let mut matching: Vec<StaffUser> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(matching)
    }
}

// ── MockStudentRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockStudentRepo {
    pub students: Arc<Mutex<Vec<Student>>>,
}

impl MockStudentRepo {
    pub fn new(students: Vec<Student>) -> Self {
        Self {
            students: Arc::new(Mutex::new(students)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl StudentRepository for MockStudentRepo {
    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, PortalError> {
        Ok(self.students.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, student: &NewStudent) -> Result<Student, PortalError> {
        let mut students = self.students.lock().unwrap();
        let created = Student {
            id: students.len() as i32 + 1,
            name: student.name.clone(),
            parent_id: student.parent_id,
            created_at: student.created_at,
        };
        students.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<StudentListing>, PortalError> {
        Ok(self
            .students
            .lock()
            .unwrap()
            .iter()
            .rev()
            .map(|s| StudentListing {
                id: s.id,
                name: s.name.clone(),
                parent_id: s.parent_id,
                parent_name: None,
                created_at: s.created_at,
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, PortalError> {
        Ok(self.students.lock().unwrap().len() as u64)
    }
}

// ── MockHomeworkRepo ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockHomeworkRepo {
    pub homeworks: Arc<Mutex<Vec<Homework>>>,
}

impl MockHomeworkRepo {
    pub fn new(homeworks: Vec<Homework>) -> Self {
        Self {
            homeworks: Arc::new(Mutex::new(homeworks)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn homeworks_handle(&self) -> Arc<Mutex<Vec<Homework>>> {
        Arc::clone(&self.homeworks)
    }
}

fn listing(h: &Homework) -> HomeworkListing {
    HomeworkListing {
        id: h.id,
        student_id: h.student_id,
        student_name: None,
        parent_name: None,
        subject: h.subject.clone(),
        image_path: h.image_path.clone(),
        status: h.status,
        teacher_note: h.teacher_note.clone(),
        created_at: h.created_at,
        updated_at: h.updated_at,
    }
}

impl HomeworkRepository for MockHomeworkRepo {
    async fn create(&self, homework: &NewHomework) -> Result<Homework, PortalError> {
        let mut homeworks = self.homeworks.lock().unwrap();
        let created = Homework {
            id: homeworks.len() as i32 + 1,
            student_id: homework.student_id,
            parent_id: homework.parent_id,
            subject: homework.subject.clone(),
            image_path: homework.image_path.clone(),
            status: HomeworkStatus::Pending,
            teacher_note: None,
            reviewed_by: None,
            created_at: homework.created_at,
            updated_at: None,
        };
        homeworks.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Homework>, PortalError> {
        Ok(self
            .homeworks
            .lock()
            .unwrap()
            .iter()
            .find(|h| h.id == id)
            .cloned())
    }

    async fn review(&self, review: &Review) -> Result<bool, PortalError> {
        let mut homeworks = self.homeworks.lock().unwrap();
        let Some(h) = homeworks
            .iter_mut()
            .find(|h| h.id == review.homework_id && h.status == HomeworkStatus::Pending)
        else {
            return Ok(false);
        };
        h.status = review.status;
        h.teacher_note = review.note.clone();
        h.reviewed_by = Some(review.reviewer_id);
        h.updated_at = Some(review.reviewed_at);
        Ok(true)
    }

    async fn list(
        &self,
        filter: StatusFilter,
        limit: Option<u64>,
    ) -> Result<Vec<HomeworkListing>, PortalError> {
        let homeworks = self.homeworks.lock().unwrap();
        let rows = homeworks
            .iter()
            .rev()
            .filter(|h| filter.status().is_none_or(|s| h.status == s))
            .map(listing);
        Ok(match limit {
            Some(n) => rows.take(n as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn list_by_parent(&self, parent_id: i32) -> Result<Vec<HomeworkListing>, PortalError> {
        Ok(self
            .homeworks
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|h| h.parent_id == Some(parent_id))
            .map(listing)
            .collect())
    }

    async fn count_by_status(&self, status: HomeworkStatus) -> Result<u64, PortalError> {
        Ok(self
            .homeworks
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.status == status)
            .count() as u64)
    }
}

// ── MockOutboxRepo ───────────────────────────────────────────────────────────

/// Outbox row state as the relay leaves it.
#[derive(Debug, Clone)]
pub struct OutboxRow {
    pub event: OutboxEvent,
    pub last_error: Option<String>,
    pub next_attempt_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct MockOutboxRepo {
    pub rows: Arc<Mutex<Vec<OutboxRow>>>,
}

impl MockOutboxRepo {
    pub fn new(events: Vec<OutboxEvent>, due_at: DateTime<Utc>) -> Self {
        let rows = events
            .into_iter()
            .map(|event| OutboxRow {
                event,
                last_error: None,
                next_attempt_at: due_at,
                processed_at: None,
                failed_at: None,
            })
            .collect();
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }

    pub fn rows_handle(&self) -> Arc<Mutex<Vec<OutboxRow>>> {
        Arc::clone(&self.rows)
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut OutboxRow)) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.event.id == id) {
            f(row);
        }
    }
}

impl OutboxRepository for MockOutboxRepo {
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<OutboxEvent>, PortalError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.processed_at.is_none() && r.failed_at.is_none())
            .filter(|r| r.next_attempt_at <= now)
            .take(limit as usize)
            .map(|r| r.event.clone())
            .collect())
    }

    async fn mark_processed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PortalError> {
        self.update(id, |row| row.processed_at = Some(at));
        Ok(())
    }

    async fn schedule_retry(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        self.update(id, |row| {
            row.event.attempts = attempts;
            row.last_error = Some(error.to_owned());
            row.next_attempt_at = next_attempt_at;
        });
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        at: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        self.update(id, |row| {
            row.event.attempts = attempts;
            row.last_error = Some(error.to_owned());
            row.failed_at = Some(at);
        });
        Ok(())
    }
}

// ── RecordingHook ────────────────────────────────────────────────────────────

/// Delivery hook that records messages, or fails every call when `failing`.
pub struct RecordingHook {
    pub delivered: Arc<Mutex<Vec<OtpMessage>>>,
    pub failing: bool,
}

impl RecordingHook {
    pub fn ok() -> Self {
        Self {
            delivered: Arc::new(Mutex::new(vec![])),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            delivered: Arc::new(Mutex::new(vec![])),
            failing: true,
        }
    }

    pub fn delivered_handle(&self) -> Arc<Mutex<Vec<OtpMessage>>> {
        Arc::clone(&self.delivered)
    }
}

impl DeliveryHook for RecordingHook {
    async fn deliver(&self, message: &OtpMessage) -> anyhow::Result<()> {
        if self.failing {
            anyhow::bail!("gateway returned 502");
        }
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_parent(id: i32, verified: bool) -> Parent {
    Parent {
        id,
        name: "Ayşe".to_owned(),
        phone: format!("0555111223{id}"),
        credential_hash: "plain:pw1".to_owned(),
        verified,
        created_at: Utc::now(),
    }
}

pub fn test_code(id: i32, parent_id: i32, code: &str, issued_at: DateTime<Utc>) -> OtpCode {
    OtpCode {
        id,
        parent_id,
        code: code.to_owned(),
        expires_at: issued_at + Duration::seconds(OTP_TTL_SECS),
        used: false,
        used_at: None,
        created_at: issued_at,
    }
}

pub fn test_staff(id: i32, username: &str, role: Role) -> StaffUser {
    StaffUser {
        id,
        full_name: format!("{username} full name"),
        username: username.to_owned(),
        credential_hash: "plain:123456".to_owned(),
        role,
        created_at: Utc::now(),
    }
}

pub fn test_student(id: i32, parent_id: Option<i32>) -> Student {
    Student {
        id,
        name: format!("student {id}"),
        parent_id,
        created_at: Utc::now(),
    }
}

pub fn test_homework(id: i32, student_id: i32, status: HomeworkStatus) -> Homework {
    Homework {
        id,
        student_id,
        parent_id: Some(1),
        subject: "Matematik".to_owned(),
        image_path: None,
        status,
        teacher_note: None,
        reviewed_by: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}
