//! Login and logout.
//!
//! Login exchanges a username/password for a bearer token and stores it in
//! the session. Logout only clears the local credential; the server keeps no
//! session state.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{ApiError, ApiGateway, Transport};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::session::Credential;

/// Request body for `POST /login`.
#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Response from `POST /login`.
#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

impl<T: Transport> ApiGateway<T> {
    /// Authenticate and store the returned credential in the session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for invalid credentials, or the
    /// classified error for any other failure. The session is left empty on
    /// failure.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), ApiError> {
        let response: LoginResponse = self
            .post(
                "/login",
                &LoginRequest {
                    username,
                    password: password.expose_secret(),
                },
            )
            .await?;

        if response.token.trim().is_empty() {
            return Err(ApiError::Unknown("login returned an empty token".to_string()));
        }

        self.session().set(Credential::new(response.token)).await;
        set_sentry_user(username);
        info!("logged in");
        Ok(())
    }

    /// Drop the local credential.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.session().clear().await {
            info!("logged out");
        }
        clear_sentry_user();
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};

    use super::*;
    use crate::api::ErrorKind;
    use crate::session::SessionStore;
    use crate::testing::MockTransport;

    #[tokio::test]
    async fn test_login_stores_token() {
        let mock = MockTransport::new();
        mock.ok(Method::POST, "/login", serde_json::json!({"token": "jwt-abc"}));
        let gateway = ApiGateway::new(mock.clone(), SessionStore::new());

        gateway
            .login("admin", &SecretString::from("hunter2"))
            .await
            .expect("login");

        let credential = gateway.session().get().await.expect("credential");
        assert_eq!(credential.expose(), "jwt-abc");

        let request = mock.last_request().expect("request");
        assert_eq!(
            request.body,
            Some(serde_json::json!({"username": "admin", "password": "hunter2"}))
        );
    }

    #[tokio::test]
    async fn test_invalid_login_is_unauthorized() {
        let mock = MockTransport::new();
        mock.respond(
            Method::POST,
            "/login",
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": "invalid credentials"}),
        );
        let gateway = ApiGateway::new(mock, SessionStore::new());

        let err = gateway
            .login("admin", &SecretString::from("wrong"))
            .await
            .expect_err("rejected");

        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.message(), "invalid credentials");
        assert!(!gateway.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let session = SessionStore::with_credential(Credential::new("jwt"));
        let gateway = ApiGateway::new(MockTransport::new(), session.clone());

        gateway.logout().await;
        assert!(!session.is_authenticated().await);
    }

    #[test]
    fn test_login_and_logout_scope_sentry_user() {
        let mock = MockTransport::new();
        mock.ok(Method::POST, "/login", serde_json::json!({"token": "jwt-abc"}));
        let gateway = ApiGateway::new(mock, SessionStore::new());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        let events = sentry::test::with_captured_events(|| {
            runtime
                .block_on(gateway.login("admin", &SecretString::from("hunter2")))
                .expect("login");
            sentry::capture_message("after login", sentry::Level::Info);
            runtime.block_on(gateway.logout());
            sentry::capture_message("after logout", sentry::Level::Info);
        });

        assert_eq!(events.len(), 2);
        let user = events[0].user.as_ref().and_then(|u| u.username.as_deref());
        assert_eq!(user, Some("admin"));
        assert!(events[1].user.is_none());
    }
}
