//! Unified error handling for the admin client.

use thiserror::Error;

use crate::api::{ApiError, ErrorKind, TransportError};
use crate::config::ConfigError;
use crate::form::FormError;

/// Application-level error type for the admin client.
#[derive(Debug, Error)]
pub enum AppError {
    /// API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Form operation rejected.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be set up.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Invalid input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error points at a fault worth tracking rather than a
    /// user or server decision.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        match self {
            Self::Api(err) => matches!(err.kind(), ErrorKind::Transport | ErrorKind::Unknown),
            Self::Form(FormError::EntityLoad(err)) => {
                matches!(err.kind(), ErrorKind::Transport | ErrorKind::Unknown)
            }
            Self::Transport(_) => true,
            Self::Form(_) | Self::Config(_) | Self::BadRequest(_) => false,
        }
    }

    /// Log the error, sending unexpected ones to Sentry.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin client error"
            );
        } else {
            tracing::warn!(error = %self, "Admin client error");
        }
    }

    /// Process exit code for the command-line surface.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Api(ApiError::Unauthorized(_)) => 3,
            Self::Api(ApiError::NotFound(_)) => 4,
            Self::Config(_) | Self::BadRequest(_) => 2,
            _ => 1,
        }
    }
}

/// Set the Sentry user context after a login.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
