use futures::future::BoxFuture;
use serde_json::Value;

use crate::models::{LoginResponse, UserProfile};

use super::ApiError;

/// The `/auth/*` endpoints, as seen by the session flows.
///
/// The session marker is never passed explicitly: implementations carry it
/// the way a browser carries a cookie.
pub trait AuthBackend: Send + Sync {
    /// `POST /auth/token/`
    fn obtain_token<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<LoginResponse, ApiError>>;

    /// `POST /auth/token/refresh/`, yielding the new access token.
    fn refresh_token(&self) -> BoxFuture<'_, Result<String, ApiError>>;

    /// `GET /auth/user/`
    fn fetch_profile<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, Result<UserProfile, ApiError>>;

    /// `POST /auth/logout/`
    fn logout<'a>(&'a self, access_token: Option<&'a str>) -> BoxFuture<'a, Result<(), ApiError>>;

    /// Authorized `GET` of any other backend path.
    fn get_json<'a>(
        &'a self,
        path: &'a str,
        access_token: &'a str,
    ) -> BoxFuture<'a, Result<Value, ApiError>>;
}
