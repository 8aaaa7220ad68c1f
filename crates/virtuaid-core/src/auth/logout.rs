use tracing::{info, warn};

use crate::api::AuthBackend;

use super::CredentialStore;

/// Sign out locally, then tell the server.
///
/// The store is cleared before the request goes out. Server-side failures
/// are logged only.
pub async fn logout(backend: &dyn AuthBackend, credentials: &CredentialStore) {
    let access_token = credentials.access_token();
    credentials.clear();
    info!("Signed out locally");

    if let Err(e) = backend.logout(access_token.as_deref()).await {
        warn!(error = %e, "Logout request failed");
    }
}
