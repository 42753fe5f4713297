//! Session cookie builders for browser clients.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "birimza_session";

/// Attributes applied to the session cookie.
#[derive(Debug, Clone, Default)]
pub struct CookieSettings {
    /// `Domain` attribute; host-only cookie when `None`.
    pub domain: Option<String>,
    /// `Secure` attribute. Disable only for plain-HTTP local development.
    pub secure: bool,
}

fn build(value: String, max_age: Duration, settings: &CookieSettings) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax);
    if let Some(domain) = &settings.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use birimza_auth_types::cookie::{set_session_cookie, CookieSettings, SESSION_COOKIE};
///
/// let settings = CookieSettings { domain: Some("okul.example".to_string()), secure: true };
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), 3600, &settings);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("okul.example"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(
    jar: CookieJar,
    value: String,
    max_age_secs: u64,
    settings: &CookieSettings,
) -> CookieJar {
    let max_age = Duration::seconds(i64::try_from(max_age_secs).unwrap_or(i64::MAX));
    jar.add(build(value, max_age, settings))
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use birimza_auth_types::cookie::{
///     clear_session_cookie, set_session_cookie, CookieSettings, SESSION_COOKIE,
/// };
///
/// let settings = CookieSettings::default();
/// let jar = set_session_cookie(CookieJar::new(), "t".to_string(), 60, &settings);
/// let jar = clear_session_cookie(jar, &settings);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(cookie.value(), "");
/// ```
pub fn clear_session_cookie(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(build(String::new(), Duration::ZERO, settings))
}
