//! Route guard: decides whether a protected destination renders or the user
//! is sent to the login view.
//!
//! ```text
//!             persist && no token
//!   start ───────────────────────▶ Checking ──reauth ok──▶ Authenticated
//!     │                               │                        │
//!     │ otherwise, from identity      └──reauth failed──┐      │ logout
//!     ▼                                                 ▼      ▼
//!   Authenticated / Unauthenticated ◀──────────────── Unauthenticated
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::AuthBackend;

use super::login::LoginRedirect;
use super::{logout, refresh_with_timeout, CredentialStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Authenticated,
    Unauthenticated,
}

/// What the caller should do with the requested destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Still checking; show a loading state.
    Pending,
    Granted,
    Redirect(LoginRedirect),
}

pub struct RouteGuard {
    credentials: CredentialStore,
    backend: Arc<dyn AuthBackend>,
    destination: String,
    reauth_timeout: Option<Duration>,
    state: Arc<watch::Sender<GuardState>>,
    alive: Arc<AtomicBool>,
    started: bool,
    task: Option<JoinHandle<()>>,
}

impl RouteGuard {
    pub fn new(
        credentials: CredentialStore,
        backend: Arc<dyn AuthBackend>,
        persist: bool,
        destination: &str,
    ) -> Self {
        let initial = Self::initial_state(&credentials, persist);
        debug!(?initial, persist, destination, "Route guard created");
        let (state, _) = watch::channel(initial);

        Self {
            credentials,
            backend,
            destination: destination.to_string(),
            reauth_timeout: None,
            state: Arc::new(state),
            alive: Arc::new(AtomicBool::new(true)),
            started: false,
            task: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.reauth_timeout = timeout;
        self
    }

    fn initial_state(credentials: &CredentialStore, persist: bool) -> GuardState {
        if persist && credentials.access_token().is_none() {
            GuardState::Checking
        } else if credentials.is_authenticated() {
            GuardState::Authenticated
        } else {
            GuardState::Unauthenticated
        }
    }

    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Kick off silent re-authentication if the guard is checking.
    /// Runs at most once per guard.
    pub fn start(&mut self) {
        if self.started || self.state() != GuardState::Checking {
            return;
        }
        self.started = true;

        let backend = Arc::clone(&self.backend);
        let credentials = self.credentials.clone();
        let state = Arc::clone(&self.state);
        let alive = Arc::clone(&self.alive);
        let timeout = self.reauth_timeout;

        self.task = Some(tokio::spawn(async move {
            if let Err(e) = refresh_with_timeout(backend.as_ref(), &credentials, timeout).await {
                debug!(error = %e, "No session to restore");
            }

            if !alive.load(Ordering::SeqCst) {
                debug!("Route guard dropped before re-authentication settled");
                return;
            }

            let next = if credentials.is_authenticated() {
                GuardState::Authenticated
            } else {
                GuardState::Unauthenticated
            };
            state.send_replace(next);
        }));
    }

    /// Wait until the guard leaves `Checking`, starting the check if needed.
    pub async fn settle(&mut self) -> GuardState {
        self.start();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Re-authentication task failed");
                self.state.send_replace(GuardState::Unauthenticated);
            }
        }

        self.state()
    }

    pub fn access(&self) -> Access {
        match self.state() {
            GuardState::Checking => Access::Pending,
            GuardState::Authenticated => Access::Granted,
            GuardState::Unauthenticated => {
                Access::Redirect(LoginRedirect::from_destination(&self.destination))
            }
        }
    }

    /// Sign out. The guard is unauthenticated before the server is contacted.
    pub async fn logout(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // A poll already running elsewhere still completes; let it land
            // before the store is cleared.
            if let Err(e) = task.await {
                debug!(error = %e, "Re-authentication stopped by logout");
            }
        }
        self.started = true;
        self.state.send_replace(GuardState::Unauthenticated);
        logout(self.backend.as_ref(), &self.credentials).await;
    }
}

impl Drop for RouteGuard {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
