//! REST API client module for the VirtuAid backend.
//!
//! This module provides the `AuthBackend` trait the session flows depend on,
//! and `ApiClient`, its `reqwest` implementation.
//!
//! Access tokens are short-lived bearer tokens. The long-lived session marker
//! travels as a cookie and is kept in a `MarkerStore` between runs.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::AuthBackend;
pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};
