//! Data models for the VirtuAid admin session.
//!
//! - `user`: the in-memory credential, the role enumeration, and the wire
//!   types returned by the `/auth/*` endpoints.

pub mod user;

pub use user::{Credential, LoginResponse, Role, TokenResponse, UserProfile};
