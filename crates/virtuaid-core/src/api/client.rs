//! API client for communicating with the VirtuAid REST backend.
//!
//! This module provides the `ApiClient` struct, which implements
//! `AuthBackend` over HTTP and plays the part of the browser's cookie jar for
//! the refresh cookie.

use std::sync::Arc;

use anyhow::Result;
use cookie::time::{Duration, OffsetDateTime};
use cookie::Cookie;
use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::MarkerStore;
use crate::config::Config;
use crate::models::{LoginResponse, TokenResponse, UserProfile};

use super::{ApiError, AuthBackend};

// ============================================================================
// Endpoints
// ============================================================================

const LOGIN_PATH: &str = "/auth/token/";
const REFRESH_PATH: &str = "/auth/token/refresh/";
const PROFILE_PATH: &str = "/auth/user/";
const LOGOUT_PATH: &str = "/auth/logout/";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// What a `Set-Cookie` header says about the session marker.
#[derive(Debug, PartialEq, Eq)]
enum MarkerUpdate {
    Set(String),
    Clear,
}

/// API client for the VirtuAid backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    cookie_name: String,
    markers: Arc<dyn MarkerStore>,
}

impl ApiClient {
    pub fn new(config: &Config, markers: Arc<dyn MarkerStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            cookie_name: config.session_cookie_name.clone(),
            markers,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn load_marker(&self) -> Option<String> {
        match self.markers.load() {
            Ok(marker) => marker,
            Err(e) => {
                warn!(error = %e, "Failed to load session marker");
                None
            }
        }
    }

    fn forget_marker(&self) {
        if let Err(e) = self.markers.clear() {
            warn!(error = %e, "Failed to clear session marker");
        }
    }

    fn with_marker(&self, request: RequestBuilder, marker: &str) -> RequestBuilder {
        request.header(header::COOKIE, format!("{}={}", self.cookie_name, marker))
    }

    /// Pick up a new, rotated, or expired marker from the response cookies.
    fn capture_marker(&self, headers: &header::HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            match parse_set_cookie(value, &self.cookie_name) {
                Some(MarkerUpdate::Set(marker)) => {
                    debug!("Session marker updated");
                    if let Err(e) = self.markers.store(&marker) {
                        warn!(error = %e, "Failed to store session marker");
                    }
                }
                Some(MarkerUpdate::Clear) => {
                    debug!("Server expired the session marker");
                    self.forget_marker();
                }
                None => {}
            }
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn login_request(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        self.capture_marker(response.headers());
        Ok(response.json().await?)
    }

    async fn refresh_request(&self) -> Result<String, ApiError> {
        let Some(marker) = self.load_marker() else {
            debug!("No session marker stored, skipping refresh request");
            return Err(ApiError::Unauthorized);
        };

        let request = self.client.post(self.url(REFRESH_PATH)).json(&serde_json::json!({}));
        let response = self.with_marker(request, &marker).send().await?;

        let response = Self::check_response(response).await?;
        self.capture_marker(response.headers());

        let token: TokenResponse = response.json().await?;
        token
            .access
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("refresh response has no access token".into()))
    }

    async fn profile_request(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let response = self
            .client
            .get(self.url(PROFILE_PATH))
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    async fn logout_request(&self, access_token: Option<&str>) -> Result<(), ApiError> {
        let marker = self.load_marker();
        // Forgotten locally whatever the server says
        self.forget_marker();

        let mut request = self.client.post(self.url(LOGOUT_PATH)).json(&serde_json::json!({}));
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        if let Some(ref marker) = marker {
            request = self.with_marker(request, marker);
        }

        let response = request.send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn get_request(&self, path: &str, access_token: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }
}

impl AuthBackend for ApiClient {
    fn obtain_token<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<LoginResponse, ApiError>> {
        self.login_request(email, password).boxed()
    }

    fn refresh_token(&self) -> BoxFuture<'_, Result<String, ApiError>> {
        self.refresh_request().boxed()
    }

    fn fetch_profile<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, Result<UserProfile, ApiError>> {
        self.profile_request(access_token).boxed()
    }

    fn logout<'a>(&'a self, access_token: Option<&'a str>) -> BoxFuture<'a, Result<(), ApiError>> {
        self.logout_request(access_token).boxed()
    }

    fn get_json<'a>(
        &'a self,
        path: &'a str,
        access_token: &'a str,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        self.get_request(path, access_token).boxed()
    }
}

/// Read one `Set-Cookie` header value. Returns `None` when it is about some
/// other cookie or cannot be parsed.
fn parse_set_cookie(header_value: &str, cookie_name: &str) -> Option<MarkerUpdate> {
    let cookie = Cookie::parse(header_value).ok()?;
    if cookie.name() != cookie_name {
        return None;
    }

    // Negative Max-Age parses as zero
    let max_age_expired = cookie.max_age().is_some_and(|age| age <= Duration::ZERO);
    let expires_passed = cookie
        .expires_datetime()
        .is_some_and(|at| at <= OffsetDateTime::now_utc());

    let value = cookie.value_trimmed();
    if value.is_empty() || max_age_expired || expires_passed {
        Some(MarkerUpdate::Clear)
    } else {
        Some(MarkerUpdate::Set(value.to_string()))
    }
}
