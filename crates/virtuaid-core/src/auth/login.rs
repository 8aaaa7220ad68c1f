//! Interactive sign-in with email and password.

use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, AuthBackend};
use crate::models::Credential;

use super::CredentialStore;

/// Where a successful login lands when no destination was remembered
pub const DEFAULT_DESTINATION: &str = "/dashboard";

/// Path of the login view
pub const LOGIN_PATH: &str = "/login";

/// Login failures, each with the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Missing Email or Password")]
    MissingCredentials,

    #[error("Incorrect Email or Password")]
    IncorrectCredentials,

    #[error("No Server Response")]
    NoServerResponse,

    #[error("Unauthorized. Manager accounts are not allowed.")]
    ManagerNotAllowed,

    #[error("Login Failed")]
    Failed(String),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NetworkUnreachable(_) => LoginError::NoServerResponse,
            ApiError::BadRequest(_) => LoginError::MissingCredentials,
            ApiError::Unauthorized => LoginError::IncorrectCredentials,
            other => LoginError::Failed(other.to_string()),
        }
    }
}

/// Redirect to the login view that remembers the requested destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub login_path: &'static str,
    pub from: Option<String>,
}

impl LoginRedirect {
    pub fn from_destination(destination: &str) -> Self {
        Self {
            login_path: LOGIN_PATH,
            from: Some(destination.to_string()).filter(|d| !d.is_empty()),
        }
    }

    /// Where to go once the user has signed in
    pub fn destination(&self) -> &str {
        self.from.as_deref().unwrap_or(DEFAULT_DESTINATION)
    }
}

/// Exchange email and password for a credential and store it.
///
/// Manager accounts are refused and leave the store untouched. The password
/// is not kept anywhere.
pub async fn login(
    backend: &dyn AuthBackend,
    credentials: &CredentialStore,
    email: &str,
    password: &str,
) -> Result<Credential, LoginError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(LoginError::MissingCredentials);
    }

    let response = backend.obtain_token(email, password).await.map_err(|e| {
        warn!(error = %e, "Login request failed");
        LoginError::from(e)
    })?;

    let role = response.role();
    if !role.can_use_console() {
        warn!("Manager account refused");
        // The server already handed out a session marker; give it back
        if let Err(e) = backend.logout(response.access.as_deref()).await {
            warn!(error = %e, "Failed to drop the refused session");
        }
        return Err(LoginError::ManagerNotAllowed);
    }

    let access_token = response
        .access
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LoginError::Failed("login response has no access token".to_string()))?;

    let credential = Credential {
        access_token: Some(access_token),
        name: response.name,
        email: Some(email.to_string()),
        role,
    };
    credentials.set(credential.clone());
    info!(role = ?role, "Login successful");
    Ok(credential)
}
