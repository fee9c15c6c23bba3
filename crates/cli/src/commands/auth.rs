//! Login commands.
//!
//! # Environment Variables
//!
//! - `LAMPSHOP_USERNAME` / `LAMPSHOP_PASSWORD` - Used when the flags are absent

use lampshop_admin::{ApiGateway, AppError, ClientConfig, Transport};
use secrecy::SecretString;

use crate::output;

/// Resolve login credentials from flags, falling back to configuration.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if only one of username and password is given.
pub fn credentials(
    username: Option<String>,
    password: Option<String>,
    config: &ClientConfig,
) -> Result<Option<(String, SecretString)>, AppError> {
    match (username, password) {
        (Some(username), Some(password)) => Ok(Some((username, SecretString::from(password)))),
        (None, None) => Ok(config
            .login
            .as_ref()
            .map(|login| (login.username.clone(), login.password.clone()))),
        _ => Err(AppError::BadRequest(
            "--username and --password must be given together".to_string(),
        )),
    }
}

/// Log in and keep the credential in the session.
///
/// # Errors
///
/// Returns `AppError::Api` if the server rejects the credentials.
pub async fn sign_in<T: Transport>(
    gateway: &ApiGateway<T>,
    username: &str,
    password: &SecretString,
) -> Result<(), AppError> {
    gateway.login(username, password).await?;
    tracing::info!(username, "Signed in");
    Ok(())
}

/// Log in and print the issued token.
///
/// # Errors
///
/// Returns `AppError::Api` if the server rejects the credentials.
pub async fn login<T: Transport>(
    gateway: &ApiGateway<T>,
    username: &str,
    password: &SecretString,
) -> Result<(), AppError> {
    sign_in(gateway, username, password).await?;
    if let Some(credential) = gateway.session().get().await {
        output::line(credential.expose());
    }
    Ok(())
}
