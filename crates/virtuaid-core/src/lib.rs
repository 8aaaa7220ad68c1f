//! Session core for the VirtuAid care-home administration console.
//!
//! Keeps an administrator signed in against the VirtuAid REST backend:
//! login and logout, silent re-authentication from a durable session marker,
//! the "keep me logged in" preference, and the route guard that decides
//! whether a protected view renders.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, AuthBackend};
pub use auth::{Access, CredentialStore, GuardState, LoginError, RouteGuard, Session};
pub use config::Config;
pub use models::{Credential, Role};
