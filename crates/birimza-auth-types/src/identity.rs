//! Per-request caller identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use birimza_domain::role::Role;
use http::request::Parts;
use http::{HeaderMap, StatusCode, header::AUTHORIZATION};

use crate::cookie::SESSION_COOKIE;
use crate::token::validate_token;

/// HMAC secret used to validate tokens. Provide it from the router state via
/// `FromRef`.
#[derive(Clone)]
pub struct TokenSecret(pub Arc<str>);

impl TokenSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Authenticated caller, taken from `Authorization: Bearer <token>` or, when
/// absent, from the session cookie.
///
/// Role enforcement is done by each handler after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: i32,
    pub role: Role,
}

impl Identity {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// 401 returned when no valid token accompanies the request.
#[derive(Debug)]
pub struct MissingIdentity;

impl IntoResponse for MissingIdentity {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "INVALID_TOKEN",
            "message": "invalid token",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return None;
    }
    Some(token.trim().to_owned())
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    TokenSecret: FromRef<S>,
{
    type Rejection = MissingIdentity;

    // Resolve synchronously and hand back a 'static future so the returned
    // future does not borrow `parts` or `state`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = TokenSecret::from_ref(state);
        let result = bearer_token(&parts.headers)
            .or_else(|| session_token(&parts.headers))
            .ok_or(MissingIdentity)
            .and_then(|token| validate_token(&token, &secret.0).map_err(|_| MissingIdentity))
            .map(|info| Identity {
                account_id: info.account_id,
                role: info.role,
            });

        async move { result }
    }
}
