//! JWT issuance and validation.

use birimza_domain::role::Role;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Account identity extracted from a validated token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub account_id: i32,
    pub role: Role,
    pub exp: u64,
}

/// A freshly signed token and its expiry (seconds since UNIX epoch).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

/// Errors returned by [`validate_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | account id (staff or parent, disambiguated by `role`) |
/// | `role` | custom | [`Role`] wire value |
/// | `exp` | `exp` | expiration, seconds since epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: u8,
    pub exp: u64,
}

/// Sign an HS256 token for `account_id` valid for `ttl_secs`.
pub fn issue_token(
    account_id: i32,
    role: Role,
    secret: &str,
    ttl_secs: u64,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let expires_at = jsonwebtoken::get_current_timestamp() + ttl_secs;
    let claims = JwtClaims {
        sub: account_id.to_string(),
        role: role.as_u8(),
        exp: expires_at,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(IssuedToken { token, expires_at })
}

/// HS256 with `exp` enforced; `sub` and `exp` must both be present.
fn decode_claims(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    use jsonwebtoken::errors::ErrorKind;

    let mut rules = Validation::default();
    rules.set_required_spec_claims(&["exp", "sub"]);
    let key = DecodingKey::from_secret(secret.as_bytes());

    match decode::<JwtClaims>(token, &key, &rules) {
        Ok(data) => Ok(data.claims),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(AuthError::Expired),
        Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => {
            Err(AuthError::InvalidSignature)
        }
        Err(_) => Err(AuthError::Malformed),
    }
}

/// Validate a bearer or cookie token, returning the account identity.
pub fn validate_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_claims(token, secret)?;
    let account_id = claims
        .sub
        .parse::<i32>()
        .map_err(|_| AuthError::Malformed)?;
    let role = Role::from_u8(claims.role).ok_or(AuthError::Malformed)?;
    Ok(TokenInfo {
        account_id,
        role,
        exp: claims.exp,
    })
}
