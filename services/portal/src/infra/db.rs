use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, SqlErr, TransactionError, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use birimza_domain::homework::{HomeworkStatus, StatusFilter};
use birimza_domain::role::Role;
use birimza_portal_schema::{homeworks, otp_codes, outbox_events, parents, staff_users, students};

use crate::domain::repository::{
    HomeworkRepository, OtpCodeRepository, OutboxRepository, ParentRepository, StaffRepository,
    StudentRepository,
};
use crate::domain::types::{
    CodeDraft, Homework, HomeworkListing, NewHomework, NewOtpCode, NewParent, NewStaffUser,
    NewStudent, OtpCode, OtpMessage, OutboxEvent, Parent, Review, StaffUser, Student,
    StudentListing,
};
use crate::error::PortalError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Map a failed insert to `conflict` on a unique-key violation, otherwise to a
/// storage error with `context`.
fn insert_error(err: DbErr, conflict: PortalError, context: &'static str) -> PortalError {
    if is_unique_violation(&err) {
        conflict
    } else {
        anyhow::Error::new(err).context(context).into()
    }
}

// ── Parent repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbParentRepository {
    pub db: DatabaseConnection,
}

impl ParentRepository for DbParentRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Parent>, PortalError> {
        let model = parents::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find parent by id")?;
        Ok(model.map(parent_from_model))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Parent>, PortalError> {
        let model = parents::Entity::find()
            .filter(parents::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .context("find parent by phone")?;
        Ok(model.map(parent_from_model))
    }

    async fn create_with_code(
        &self,
        parent: &NewParent,
        code: &CodeDraft,
    ) -> Result<(Parent, OtpCode), PortalError> {
        let (parent, code) = self
            .db
            .transaction::<_, (parents::Model, otp_codes::Model), DbErr>(|txn| {
                let parent = parent.clone();
                let draft = code.clone();
                Box::pin(async move {
                    let parent = parents::ActiveModel {
                        name: Set(parent.name),
                        phone: Set(parent.phone),
                        credential_hash: Set(parent.credential_hash),
                        verified: Set(false),
                        created_at: Set(parent.created_at),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    let message = OtpMessage {
                        parent_id: parent.id,
                        phone: parent.phone.clone(),
                        code: draft.code.clone(),
                    };
                    let code = insert_code(txn, &draft.for_parent(parent.id), &message).await?;
                    Ok((parent, code))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Transaction(err) => {
                    insert_error(err, PortalError::PhoneAlreadyRegistered, "register parent")
                }
                TransactionError::Connection(err) => {
                    anyhow::Error::new(err).context("register parent").into()
                }
            })?;
        Ok((parent_from_model(parent), otp_from_model(code)))
    }

    async fn count(&self) -> Result<u64, PortalError> {
        let count = parents::Entity::find()
            .count(&self.db)
            .await
            .context("count parents")?;
        Ok(count)
    }
}

fn parent_from_model(model: parents::Model) -> Parent {
    Parent {
        id: model.id,
        name: model.name,
        phone: model.phone,
        credential_hash: model.credential_hash,
        verified: model.verified,
        created_at: model.created_at,
    }
}

// ── OTP code repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpCodeRepository {
    pub db: DatabaseConnection,
}

impl OtpCodeRepository for DbOtpCodeRepository {
    async fn create_with_outbox(
        &self,
        code: &NewOtpCode,
        message: &OtpMessage,
    ) -> Result<OtpCode, PortalError> {
        let model = self
            .db
            .transaction::<_, otp_codes::Model, DbErr>(|txn| {
                let code = code.clone();
                let message = message.clone();
                Box::pin(async move { insert_code(txn, &code, &message).await })
            })
            .await
            .context("create otp code with outbox")?;
        Ok(otp_from_model(model))
    }

    async fn find_latest_unused(
        &self,
        parent_id: i32,
        code: &str,
    ) -> Result<Option<OtpCode>, PortalError> {
        let model = otp_codes::Entity::find()
            .filter(otp_codes::Column::ParentId.eq(parent_id))
            .filter(otp_codes::Column::Code.eq(code))
            .filter(otp_codes::Column::Used.eq(false))
            .order_by_desc(otp_codes::Column::CreatedAt)
            .order_by_desc(otp_codes::Column::Id)
            .one(&self.db)
            .await
            .context("find latest unused otp code")?;
        Ok(model.map(otp_from_model))
    }

    async fn consume(
        &self,
        code_id: i32,
        parent_id: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, PortalError> {
        let consumed = self
            .db
            .transaction::<_, bool, DbErr>(move |txn| {
                Box::pin(async move {
                    // Row-level guard: only one caller can flip `used`.
                    let result = otp_codes::Entity::update_many()
                        .col_expr(otp_codes::Column::Used, Expr::value(true))
                        .col_expr(otp_codes::Column::UsedAt, Expr::value(Some(at)))
                        .filter(otp_codes::Column::Id.eq(code_id))
                        .filter(otp_codes::Column::ParentId.eq(parent_id))
                        .filter(otp_codes::Column::Used.eq(false))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    parents::Entity::update_many()
                        .col_expr(parents::Column::Verified, Expr::value(true))
                        .filter(parents::Column::Id.eq(parent_id))
                        .exec(txn)
                        .await?;
                    Ok(true)
                })
            })
            .await
            .context("consume otp code")?;
        Ok(consumed)
    }
}

/// Code row plus its delivery event, inside the caller's transaction.
async fn insert_code(
    txn: &DatabaseTransaction,
    code: &NewOtpCode,
    message: &OtpMessage,
) -> Result<otp_codes::Model, DbErr> {
    let model = otp_codes::ActiveModel {
        parent_id: Set(code.parent_id),
        code: Set(code.code.clone()),
        expires_at: Set(code.expires_at),
        used: Set(false),
        used_at: Set(None),
        created_at: Set(code.created_at),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    insert_outbox_event(txn, &OutboxEvent::otp_issued(model.id, message)).await?;
    Ok(model)
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
) -> Result<(), DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(event.attempts),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn otp_from_model(model: otp_codes::Model) -> OtpCode {
    OtpCode {
        id: model.id,
        parent_id: model.parent_id,
        code: model.code,
        expires_at: model.expires_at,
        used: model.used,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}

// ── Staff repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStaffRepository {
    pub db: DatabaseConnection,
}

impl StaffRepository for DbStaffRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<StaffUser>, PortalError> {
        let model = staff_users::Entity::find()
            .filter(staff_users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find staff user by username")?;
        model.map(staff_from_model).transpose()
    }

    async fn create(&self, user: &NewStaffUser) -> Result<StaffUser, PortalError> {
        let model = staff_users::ActiveModel {
            full_name: Set(user.full_name.clone()),
            username: Set(user.username.clone()),
            credential_hash: Set(user.credential_hash.clone()),
            role: Set(i16::from(user.role.as_u8())),
            created_at: Set(user.created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| insert_error(e, PortalError::UsernameAlreadyTaken, "create staff user"))?;
        staff_from_model(model)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<StaffUser>, PortalError> {
        let models = staff_users::Entity::find()
            .filter(staff_users::Column::Role.eq(i16::from(role.as_u8())))
            .order_by_desc(staff_users::Column::Id)
            .all(&self.db)
            .await
            .context("list staff users by role")?;
        models.into_iter().map(staff_from_model).collect()
    }
}

fn staff_from_model(model: staff_users::Model) -> Result<StaffUser, PortalError> {
    let role = u8::try_from(model.role)
        .ok()
        .and_then(Role::from_u8)
        .filter(|role| role.is_staff())
        .with_context(|| format!("staff user {} has invalid role {}", model.id, model.role))?;
    Ok(StaffUser {
        id: model.id,
        full_name: model.full_name,
        username: model.username,
        credential_hash: model.credential_hash,
        role,
        created_at: model.created_at,
    })
}

// ── Student repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStudentRepository {
    pub db: DatabaseConnection,
}

#[derive(FromQueryResult)]
struct StudentRow {
    id: i32,
    name: String,
    parent_id: Option<i32>,
    parent_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl StudentRepository for DbStudentRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, PortalError> {
        let model = students::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find student by id")?;
        Ok(model.map(student_from_model))
    }

    async fn create(&self, student: &NewStudent) -> Result<Student, PortalError> {
        let model = students::ActiveModel {
            name: Set(student.name.clone()),
            parent_id: Set(student.parent_id),
            created_at: Set(student.created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create student")?;
        Ok(student_from_model(model))
    }

    async fn list(&self) -> Result<Vec<StudentListing>, PortalError> {
        let rows = students::Entity::find()
            .select_only()
            .column(students::Column::Id)
            .column(students::Column::Name)
            .column(students::Column::ParentId)
            .column(students::Column::CreatedAt)
            .column_as(parents::Column::Name, "parent_name")
            .join(JoinType::LeftJoin, students::Relation::Parent.def())
            .order_by_desc(students::Column::Id)
            .into_model::<StudentRow>()
            .all(&self.db)
            .await
            .context("list students")?;
        Ok(rows
            .into_iter()
            .map(|row| StudentListing {
                id: row.id,
                name: row.name,
                parent_id: row.parent_id,
                parent_name: row.parent_name,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, PortalError> {
        let count = students::Entity::find()
            .count(&self.db)
            .await
            .context("count students")?;
        Ok(count)
    }
}

fn student_from_model(model: students::Model) -> Student {
    Student {
        id: model.id,
        name: model.name,
        parent_id: model.parent_id,
        created_at: model.created_at,
    }
}

// ── Homework repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbHomeworkRepository {
    pub db: DatabaseConnection,
}

#[derive(FromQueryResult)]
struct HomeworkRow {
    id: i32,
    student_id: i32,
    student_name: Option<String>,
    parent_name: Option<String>,
    subject: String,
    image_path: Option<String>,
    status: String,
    teacher_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl DbHomeworkRepository {
    fn listing_query() -> sea_orm::Select<homeworks::Entity> {
        homeworks::Entity::find()
            .select_only()
            .column(homeworks::Column::Id)
            .column(homeworks::Column::StudentId)
            .column(homeworks::Column::Subject)
            .column(homeworks::Column::ImagePath)
            .column(homeworks::Column::Status)
            .column(homeworks::Column::TeacherNote)
            .column(homeworks::Column::CreatedAt)
            .column(homeworks::Column::UpdatedAt)
            .column_as(students::Column::Name, "student_name")
            .column_as(parents::Column::Name, "parent_name")
            .join(JoinType::LeftJoin, homeworks::Relation::Student.def())
            .join(JoinType::LeftJoin, homeworks::Relation::Parent.def())
            .order_by_desc(homeworks::Column::Id)
    }
}

impl HomeworkRepository for DbHomeworkRepository {
    async fn create(&self, homework: &NewHomework) -> Result<Homework, PortalError> {
        let model = homeworks::ActiveModel {
            student_id: Set(homework.student_id),
            parent_id: Set(homework.parent_id),
            subject: Set(homework.subject.clone()),
            image_path: Set(homework.image_path.clone()),
            status: Set(HomeworkStatus::Pending.as_str().to_owned()),
            teacher_note: Set(None),
            reviewed_by: Set(None),
            created_at: Set(homework.created_at),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create homework")?;
        homework_from_model(model)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Homework>, PortalError> {
        let model = homeworks::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find homework by id")?;
        model.map(homework_from_model).transpose()
    }

    async fn review(&self, review: &Review) -> Result<bool, PortalError> {
        let result = homeworks::Entity::update_many()
            .col_expr(homeworks::Column::Status, Expr::value(review.status.as_str()))
            .col_expr(homeworks::Column::TeacherNote, Expr::value(review.note.clone()))
            .col_expr(homeworks::Column::ReviewedBy, Expr::value(Some(review.reviewer_id)))
            .col_expr(homeworks::Column::UpdatedAt, Expr::value(Some(review.reviewed_at)))
            .filter(homeworks::Column::Id.eq(review.homework_id))
            .filter(homeworks::Column::Status.eq(HomeworkStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .context("review homework")?;
        Ok(result.rows_affected == 1)
    }

    async fn list(
        &self,
        filter: StatusFilter,
        limit: Option<u64>,
    ) -> Result<Vec<HomeworkListing>, PortalError> {
        let mut query = Self::listing_query();
        if let Some(status) = filter.status() {
            query = query.filter(homeworks::Column::Status.eq(status.as_str()));
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let rows = query
            .into_model::<HomeworkRow>()
            .all(&self.db)
            .await
            .context("list homeworks")?;
        rows.into_iter().map(listing_from_row).collect()
    }

    async fn list_by_parent(&self, parent_id: i32) -> Result<Vec<HomeworkListing>, PortalError> {
        let rows = Self::listing_query()
            .filter(homeworks::Column::ParentId.eq(parent_id))
            .into_model::<HomeworkRow>()
            .all(&self.db)
            .await
            .context("list homeworks by parent")?;
        rows.into_iter().map(listing_from_row).collect()
    }

    async fn count_by_status(&self, status: HomeworkStatus) -> Result<u64, PortalError> {
        let count = homeworks::Entity::find()
            .filter(homeworks::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .context("count homeworks by status")?;
        Ok(count)
    }
}

fn parse_status(raw: &str) -> Result<HomeworkStatus, PortalError> {
    let status = raw
        .parse::<HomeworkStatus>()
        .context("decode homework status")?;
    Ok(status)
}

fn homework_from_model(model: homeworks::Model) -> Result<Homework, PortalError> {
    Ok(Homework {
        id: model.id,
        student_id: model.student_id,
        parent_id: model.parent_id,
        subject: model.subject,
        image_path: model.image_path,
        status: parse_status(&model.status)?,
        teacher_note: model.teacher_note,
        reviewed_by: model.reviewed_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn listing_from_row(row: HomeworkRow) -> Result<HomeworkListing, PortalError> {
    Ok(HomeworkListing {
        id: row.id,
        student_id: row.student_id,
        student_name: row.student_name,
        parent_name: row.parent_name,
        subject: row.subject,
        image_path: row.image_path,
        status: parse_status(&row.status)?,
        teacher_note: row.teacher_note,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

// ── Outbox repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboxRepository {
    pub db: DatabaseConnection,
}

impl OutboxRepository for DbOutboxRepository {
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<OutboxEvent>, PortalError> {
        let models = outbox_events::Entity::find()
            .filter(outbox_events::Column::ProcessedAt.is_null())
            .filter(outbox_events::Column::FailedAt.is_null())
            .filter(outbox_events::Column::NextAttemptAt.lte(now))
            .order_by_asc(outbox_events::Column::NextAttemptAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("fetch due outbox events")?;
        Ok(models
            .into_iter()
            .map(|model| OutboxEvent {
                id: model.id,
                kind: model.kind,
                payload: model.payload,
                idempotency_key: model.idempotency_key,
                attempts: model.attempts,
            })
            .collect())
    }

    async fn mark_processed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), PortalError> {
        outbox_events::ActiveModel {
            id: Set(id),
            processed_at: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark outbox event processed")?;
        Ok(())
    }

    async fn schedule_retry(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        outbox_events::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            last_error: Set(Some(error.to_owned())),
            next_attempt_at: Set(next_attempt_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("schedule outbox retry")?;
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        at: DateTime<Utc>,
    ) -> Result<(), PortalError> {
        outbox_events::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            last_error: Set(Some(error.to_owned())),
            failed_at: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark outbox event failed")?;
        Ok(())
    }
}
