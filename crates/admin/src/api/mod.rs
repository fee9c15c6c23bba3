//! Authenticated API gateway.
//!
//! Every outbound call goes through [`ApiGateway`], which:
//! - attaches the session credential as a bearer header when one is present
//! - classifies failures into [`ErrorKind`]s with a human-readable message
//! - clears the [`SessionStore`] on `401` before handing the error back
//!
//! The gateway never retries. Retrying is a fresh, caller-initiated action.
//!
//! Endpoint wrappers live in the submodules as further `impl ApiGateway`
//! blocks, one per resource.

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod transport;

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::session::SessionStore;

pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};

/// Classification of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credential missing, expired or rejected. The session has been cleared.
    Unauthorized,
    /// Unknown entity or category.
    NotFound,
    /// The server rejected the payload.
    Validation,
    /// Network failure or server unavailable.
    Transport,
    /// Anything else.
    Unknown,
}

/// A failed API call: a classification plus a displayable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Authorization failure (`401`).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (`404`).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload rejected (`400`, `409`, `422`).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Network failure or `5xx`.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Unclassified failure.
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl ApiError {
    /// The classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// The human-readable message, without the classification prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(m)
            | Self::NotFound(m)
            | Self::Validation(m)
            | Self::Transport(m)
            | Self::Unknown(m) => m,
        }
    }

    /// Classify a non-success response.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(message)
            }
            s if s.is_server_error() => Self::Transport(message),
            _ => Self::Unknown(message),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Error body shape returned by the server.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract the server's error message, or describe the status.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

/// Gateway for all API calls.
///
/// Cheap to clone; clones share the transport and the session store.
pub struct ApiGateway<T> {
    inner: Arc<GatewayInner<T>>,
}

struct GatewayInner<T> {
    transport: T,
    session: SessionStore,
}

impl<T> Clone for ApiGateway<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for ApiGateway<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ApiGateway<T> {
    /// Create a gateway over `transport` reading credentials from `session`.
    #[must_use]
    pub fn new(transport: T, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(GatewayInner { transport, session }),
        }
    }

    /// The session store this gateway reads and clears.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on any failure.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send_json(ApiRequest::new(Method::GET, path)).await
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on any failure.
    pub async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = ApiRequest::new(Method::POST, path).with_json(encode(body)?);
        self.send_json(request).await
    }

    /// `PUT` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on any failure.
    pub async fn put<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = ApiRequest::new(Method::PUT, path).with_json(encode(body)?);
        self.send_json(request).await
    }

    /// `DELETE` a resource, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on any failure.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::new(Method::DELETE, path))
            .await
            .map(|_| ())
    }

    /// Send a request and decode its JSON response.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError`; an undecodable success body is
    /// `ApiError::Unknown`.
    pub async fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::Unknown(format!("invalid response body: {e}")))
    }

    /// Send a request and return the raw success body.
    ///
    /// The session is cleared before an `Unauthorized` error is returned, so
    /// any call issued after this one observes the cleared state.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` on any failure.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, mut request: ApiRequest) -> Result<String, ApiError> {
        if let Some(credential) = self.inner.session.get().await {
            match credential.bearer_header() {
                Some(value) => {
                    request.headers.insert(AUTHORIZATION, value);
                }
                None => warn!("stored credential is not a valid header value; sending without it"),
            }
        }

        let response = self.inner.transport.send(request).await.map_err(|e| {
            warn!(error = %e, "transport failure");
            ApiError::from(e)
        })?;

        if response.status.is_success() {
            return Ok(response.body);
        }

        let error = ApiError::from_response(response.status, &response.body);
        if error.kind() == ErrorKind::Unauthorized && self.inner.session.clear().await {
            info!("credential rejected by server; session cleared");
        }
        warn!(
            status = response.status.as_u16(),
            kind = ?error.kind(),
            error = %error.message(),
            "API request failed"
        );
        Err(error)
    }
}

fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Unknown(format!("failed to encode request: {e}")))
}
