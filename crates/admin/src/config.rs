//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LAMPSHOP_API_URL` - API base URL (default: `http://localhost:8080`)
//! - `LAMPSHOP_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `LAMPSHOP_NOTIFICATION_SECS` - Notification visibility window (default: 3)
//! - `LAMPSHOP_TOKEN` - Previously issued bearer token to start the session with
//! - `LAMPSHOP_USERNAME` / `LAMPSHOP_PASSWORD` - Login credentials (both or neither)
//! - `LAMPSHOP_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::api::{ApiGateway, ReqwestTransport, TransportError};
use crate::session::{Credential, SessionStore};

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";
const DEFAULT_NOTIFICATION_SECS: &str = "3";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL
    pub api_url: Url,
    /// Transport request timeout
    pub http_timeout: Duration,
    /// How long notifications stay visible
    pub notification_window: Duration,
    /// Preloaded bearer token
    pub token: Option<SecretString>,
    /// Login credentials (optional)
    pub login: Option<LoginConfig>,
    /// Emit JSON logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

/// Username/password login.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct LoginConfig {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let username = get_optional(lookup, "LAMPSHOP_USERNAME");
        let password = get_optional(lookup, "LAMPSHOP_PASSWORD");

        match (username, password) {
            (Some(username), Some(password)) => Ok(Some(Self {
                username,
                password: SecretString::from(password),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("LAMPSHOP_PASSWORD".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("LAMPSHOP_USERNAME".to_string())),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or only
    /// half of the login credentials are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = get_or_default(&lookup, "LAMPSHOP_API_URL", DEFAULT_API_URL);
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("LAMPSHOP_API_URL".to_string(), e.to_string()))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "LAMPSHOP_API_URL".to_string(),
                format!("unsupported scheme '{}'", api_url.scheme()),
            ));
        }

        let http_timeout =
            get_seconds(&lookup, "LAMPSHOP_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        let notification_window =
            get_seconds(&lookup, "LAMPSHOP_NOTIFICATION_SECS", DEFAULT_NOTIFICATION_SECS)?;
        let token = get_optional(&lookup, "LAMPSHOP_TOKEN").map(SecretString::from);
        let login = LoginConfig::from_lookup(&lookup)?;
        let log_json = get_optional(&lookup, "LAMPSHOP_LOG_JSON")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let sentry_dsn = get_optional(&lookup, "SENTRY_DSN");
        let sentry_environment = get_optional(&lookup, "SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional(&lookup, "SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            api_url,
            http_timeout,
            notification_window,
            token,
            login,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// A session store seeded with the configured token, if any.
    #[must_use]
    pub fn session(&self) -> SessionStore {
        self.token.clone().map_or_else(SessionStore::new, |token| {
            SessionStore::with_credential(Credential::from(token))
        })
    }

    /// Build a gateway over the production transport.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Setup` if the HTTP client cannot be built.
    pub fn gateway(&self) -> Result<ApiGateway<ReqwestTransport>, TransportError> {
        let transport = ReqwestTransport::new(&self.api_url, self.http_timeout)?;
        Ok(ApiGateway::new(transport, self.session()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating blank values as unset.
fn get_optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a positive whole number of seconds.
fn get_seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<Duration, ConfigError> {
    let secs = get_or_default(lookup, key, default)
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
