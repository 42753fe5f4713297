//! Bearer-token helpers for router tests.
//!
//! Handlers authenticate callers from a signed token. `MockAuth` signs one
//! with the test secret so a request can act as any account and role.

use birimza_auth_types::token::issue_token;
use birimza_domain::role::Role;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};

/// Secret shared by the router test state and [`MockAuth`].
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub account_id: i32,
    pub role: Role,
}

impl MockAuth {
    pub fn new(account_id: i32, role: Role) -> Self {
        Self { account_id, role }
    }

    pub fn admin() -> Self {
        Self::new(1, Role::Admin)
    }

    pub fn teacher(account_id: i32) -> Self {
        Self::new(account_id, Role::Teacher)
    }

    pub fn parent(account_id: i32) -> Self {
        Self::new(account_id, Role::Parent)
    }

    /// Signed token for this identity, valid for one hour.
    pub fn token(&self) -> String {
        issue_token(self.account_id, self.role, TEST_JWT_SECRET, 3600)
            .expect("sign test token")
            .token
    }

    /// `Authorization: Bearer …` header value.
    pub fn bearer(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token())).expect("valid header value")
    }

    /// Headers as a client would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, self.bearer());
        map
    }
}
