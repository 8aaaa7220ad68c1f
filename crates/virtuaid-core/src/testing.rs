//! Scripted `AuthBackend` for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::api::{ApiError, AuthBackend};
use crate::auth::CredentialStore;
use crate::models::{LoginResponse, UserProfile};

pub struct ScriptedBackend {
    login: Result<LoginResponse, ApiError>,
    refresh: Result<String, ApiError>,
    profile: Result<UserProfile, ApiError>,
    logout: Result<(), ApiError>,
    get_responses: Mutex<VecDeque<Result<Value, ApiError>>>,
    refresh_delay: Option<Duration>,
    refresh_hangs: bool,
    refresh_blocks: Option<Duration>,
    observed: Option<CredentialStore>,

    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub profile_tokens: Mutex<Vec<String>>,
    pub get_tokens: Mutex<Vec<String>>,
    /// Whether the observed store still held an identity when logout was sent
    pub logout_saw_identity: Mutex<Option<bool>>,
}

pub fn profile(name: &str, email: &str, is_superadmin: bool, is_admin: bool) -> UserProfile {
    UserProfile {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        is_superadmin,
        is_admin,
        is_manager: false,
    }
}

pub fn login_response(access: &str, name: &str, is_admin: bool, is_manager: bool) -> LoginResponse {
    LoginResponse {
        access: Some(access.to_string()),
        name: Some(name.to_string()),
        is_admin,
        is_superadmin: false,
        is_manager,
    }
}

impl ScriptedBackend {
    /// Every endpoint rejects until scripted otherwise.
    pub fn new() -> Self {
        Self {
            login: Err(ApiError::Unauthorized),
            refresh: Err(ApiError::Unauthorized),
            profile: Err(ApiError::Unauthorized),
            logout: Ok(()),
            get_responses: Mutex::new(VecDeque::new()),
            refresh_delay: None,
            refresh_hangs: false,
            refresh_blocks: None,
            observed: None,
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            profile_tokens: Mutex::new(Vec::new()),
            get_tokens: Mutex::new(Vec::new()),
            logout_saw_identity: Mutex::new(None),
        }
    }

    pub fn with_login(mut self, result: Result<LoginResponse, ApiError>) -> Self {
        self.login = result;
        self
    }

    pub fn with_refresh(mut self, result: Result<String, ApiError>) -> Self {
        self.refresh = result;
        self
    }

    pub fn with_profile(mut self, result: Result<UserProfile, ApiError>) -> Self {
        self.profile = result;
        self
    }

    pub fn with_logout(mut self, result: Result<(), ApiError>) -> Self {
        self.logout = result;
        self
    }

    pub fn with_get_responses(self, responses: Vec<Result<Value, ApiError>>) -> Self {
        *self.get_responses.lock().unwrap() = responses.into();
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = Some(delay);
        self
    }

    /// Refresh blocks its worker thread for `duration` inside a single poll.
    pub fn with_blocking_refresh(mut self, duration: Duration) -> Self {
        self.refresh_blocks = Some(duration);
        self
    }

    pub fn hanging_refresh(mut self) -> Self {
        self.refresh_hangs = true;
        self
    }

    pub fn observing(mut self, store: CredentialStore) -> Self {
        self.observed = Some(store);
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthBackend for ScriptedBackend {
    fn obtain_token<'a>(
        &'a self,
        _email: &'a str,
        _password: &'a str,
    ) -> BoxFuture<'a, Result<LoginResponse, ApiError>> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.login.clone();
        async move { result }.boxed()
    }

    fn refresh_token(&self) -> BoxFuture<'_, Result<String, ApiError>> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if let Some(duration) = self.refresh_blocks {
                std::thread::sleep(duration);
            }
            if self.refresh_hangs {
                futures::future::pending::<()>().await;
            }
            if let Some(delay) = self.refresh_delay {
                tokio::time::sleep(delay).await;
            }
            self.refresh.clone()
        }
        .boxed()
    }

    fn fetch_profile<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, Result<UserProfile, ApiError>> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profile_tokens.lock().unwrap().push(access_token.to_string());
        let result = self.profile.clone();
        async move { result }.boxed()
    }

    fn logout<'a>(&'a self, _access_token: Option<&'a str>) -> BoxFuture<'a, Result<(), ApiError>> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref store) = self.observed {
            *self.logout_saw_identity.lock().unwrap() = Some(store.is_authenticated());
        }
        let result = self.logout.clone();
        async move { result }.boxed()
    }

    fn get_json<'a>(
        &'a self,
        _path: &'a str,
        access_token: &'a str,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.get_tokens.lock().unwrap().push(access_token.to_string());
        let result = self
            .get_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ApiError::ServerRejected {
                status: 404,
                body: String::new(),
            }));
        async move { result }.boxed()
    }
}
