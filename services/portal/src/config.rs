use serde::Deserialize;

use birimza_auth_types::cookie::CookieSettings;
use birimza_core::config::Config;

/// Portal service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct PortalConfig {
    /// Database connection URL (`postgres://…` or `sqlite://…`).
    pub database_url: String,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// TCP port to listen on (default 5000). Env var: `PORTAL_PORT`.
    #[serde(default = "default_port")]
    pub portal_port: u16,
    /// Cookie domain attribute; host-only cookie when unset.
    #[serde(default)]
    pub cookie_domain: Option<String>,
    /// Set `Secure` on the session cookie (default true).
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Session token lifetime in seconds (default 4 hours).
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Apply pending migrations on startup (default true).
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Bootstrap admin password. No admin is created when unset.
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub outbox_poll_interval_secs: u64,
    /// Endpoint receiving OTP messages; codes are only logged when unset.
    #[serde(default)]
    pub sms_webhook_url: Option<String>,
}

impl Config for PortalConfig {}

impl PortalConfig {
    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            domain: self.cookie_domain.clone(),
            secure: self.cookie_secure,
        }
    }
}

fn default_port() -> u16 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_token_ttl() -> u64 {
    4 * 60 * 60
}

fn default_admin_username() -> String {
    "admin".to_owned()
}

fn default_poll_interval() -> u64 {
    5
}
