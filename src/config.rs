use chrono::{Duration, Utc};
use std::env;

/// Fallback signing secret for local development and tests.
pub const LOCAL_JWT_SECRET: &str = "portal-local-development-secret";

/// AppConfig
///
/// The service configuration, loaded once at startup and immutable afterwards. It is pulled
/// into handlers and extractors from `AppState` via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local `x-user-id` bypass and log format.
    pub env: Env,
    // Secret used to sign and validate session tokens.
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Lifetime of a login session, in seconds.
    pub session_ttl_secs: i64,
    // Base URL of an external identity service. When unset, the seeded directory is used.
    pub identity_url: Option<String>,
    pub identity_api_key: Option<String>,
    // Accept the `x-user-id` header in place of a session token. Only honoured in `Local`.
    // The seeded account ids are fixed, so anyone reaching the server can act as any of them.
    pub dev_auth_bypass: bool,
}

/// Env
///
/// Runtime context: `Local` enables development conveniences, `Production` demands explicit
/// secrets.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            session_ttl_secs: 8 * 60 * 60,
            identity_url: None,
            identity_api_key: None,
            dev_auth_bypass: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `Production` when `JWT_SECRET` is missing, and whenever `SESSION_TTL_SECS`
    /// is set but is not a positive integer whose session end fits the date range. The
    /// service must not start half-configured.
    ///
    /// `DEV_AUTH_BYPASS` (`1` or `true`) enables the `x-user-id` header; it is ignored in
    /// `Production`.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").unwrap_or_else(|_| "local".to_string()).as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl > 0 && session_end_representable(*ttl))
                .expect("FATAL: SESSION_TTL_SECS must be a positive integer within the date range."),
            Err(_) => 8 * 60 * 60,
        };

        let dev_auth_bypass = env == Env::Local
            && env::var("DEV_AUTH_BYPASS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        Self {
            env,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            session_ttl_secs,
            identity_url: env::var("IDENTITY_URL").ok().filter(|url| !url.is_empty()),
            identity_api_key: env::var("IDENTITY_API_KEY").ok(),
            dev_auth_bypass,
        }
    }
}

// A session opened now with this lifetime must end at a representable instant.
fn session_end_representable(ttl_secs: i64) -> bool {
    Duration::try_seconds(ttl_secs).is_some_and(|ttl| Utc::now().checked_add_signed(ttl).is_some())
}
