//! Silent re-authentication: trade the durable session marker for a fresh
//! access token without asking for credentials again.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{ApiError, AuthBackend};
use crate::models::Credential;

use super::CredentialStore;

/// Refresh the access token and, on a cold start, the user's profile.
///
/// Cold start (no display name in the store): the token is exchanged, the
/// profile fetched with it, and the store set to the full credential.
/// Warm refresh: only the token is merged into the existing credential.
///
/// On any failure the store is cleared and the error returned for logging.
pub async fn silent_reauth(
    backend: &dyn AuthBackend,
    credentials: &CredentialStore,
) -> Result<String, ApiError> {
    match exchange(backend, credentials).await {
        Ok(token) => Ok(token),
        Err(e) => {
            warn!(error = %e, kind = ?e.kind(), "Silent re-authentication failed");
            credentials.clear();
            Err(e)
        }
    }
}

/// `silent_reauth` bounded by an optional timeout.
///
/// A timeout counts as no server response and clears the store like any other
/// failure.
pub async fn refresh_with_timeout(
    backend: &dyn AuthBackend,
    credentials: &CredentialStore,
    timeout: Option<Duration>,
) -> Result<String, ApiError> {
    let Some(limit) = timeout else {
        return silent_reauth(backend, credentials).await;
    };

    match tokio::time::timeout(limit, silent_reauth(backend, credentials)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_secs = limit.as_secs_f64(), "Silent re-authentication timed out");
            credentials.clear();
            Err(ApiError::NetworkUnreachable(format!(
                "re-authentication timed out after {:?}",
                limit
            )))
        }
    }
}

async fn exchange(
    backend: &dyn AuthBackend,
    credentials: &CredentialStore,
) -> Result<String, ApiError> {
    let token = backend.refresh_token().await?;
    if token.is_empty() {
        return Err(ApiError::InvalidResponse(
            "refresh response has no access token".into(),
        ));
    }
    debug!("Access token refreshed");

    if credentials.has_name() {
        credentials.merge_token(&token);
        return Ok(token);
    }

    let profile = backend.fetch_profile(&token).await?;
    let credential = Credential::from_profile(token.clone(), profile);
    if !credential.role.can_use_console() {
        warn!(role = ?credential.role, "Restored session belongs to a manager, refusing");
        return Err(ApiError::Unauthorized);
    }
    info!(role = ?credential.role, "Session restored");
    credentials.set(credential);
    Ok(token)
}
