use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Portal service error variants.
///
/// Infrastructure failures reach `ServiceUnavailable` through `?` on an
/// `anyhow` context; `Internal` is reserved for failures that are not the
/// database's fault (token signing, hashing).
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("parent not found")]
    ParentNotFound,
    #[error("staff user not found")]
    StaffNotFound,
    #[error("student not found")]
    StudentNotFound,
    #[error("homework not found")]
    HomeworkNotFound,
    #[error("phone already registered")]
    PhoneAlreadyRegistered,
    #[error("username already taken")]
    UsernameAlreadyTaken,
    #[error("homework already reviewed")]
    HomeworkAlreadyReviewed,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("invalid code")]
    InvalidCode,
    #[error("code expired")]
    ExpiredCode,
    #[error("account not verified")]
    Unverified,
    #[error("invalid token")]
    InvalidToken,
    #[error("forbidden")]
    Forbidden,
    #[error("invalid phone")]
    InvalidPhone,
    #[error("invalid status")]
    InvalidStatus,
    #[error("missing data")]
    MissingData,
    #[error("service unavailable")]
    ServiceUnavailable(#[from] anyhow::Error),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl PortalError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParentNotFound => "PARENT_NOT_FOUND",
            Self::StaffNotFound => "STAFF_NOT_FOUND",
            Self::StudentNotFound => "STUDENT_NOT_FOUND",
            Self::HomeworkNotFound => "HOMEWORK_NOT_FOUND",
            Self::PhoneAlreadyRegistered => "PHONE_ALREADY_REGISTERED",
            Self::UsernameAlreadyTaken => "USERNAME_ALREADY_TAKEN",
            Self::HomeworkAlreadyReviewed => "HOMEWORK_ALREADY_REVIEWED",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::InvalidCode => "INVALID_CODE",
            Self::ExpiredCode => "EXPIRED_CODE",
            Self::Unverified => "UNVERIFIED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidPhone => "INVALID_PHONE",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::MissingData => "MISSING_DATA",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::Internal(error.into())
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ParentNotFound
            | Self::StaffNotFound
            | Self::StudentNotFound
            | Self::HomeworkNotFound => StatusCode::NOT_FOUND,
            Self::PhoneAlreadyRegistered
            | Self::UsernameAlreadyTaken
            | Self::HomeworkAlreadyReviewed => StatusCode::CONFLICT,
            Self::InvalidCredential | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::InvalidCode | Self::InvalidPhone | Self::InvalidStatus | Self::MissingData => {
                StatusCode::BAD_REQUEST
            }
            Self::ExpiredCode => StatusCode::GONE,
            Self::Unverified | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client outcomes; TraceLayer already records them.
        match &self {
            Self::ServiceUnavailable(e) | Self::Internal(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "request failed");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
