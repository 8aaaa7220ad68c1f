//! Authentication module for keeping an administrator signed in.
//!
//! This module provides:
//! - `CredentialStore`: the shared in-memory credential
//! - `PreferenceStore`: durable "keep me logged in" preference
//! - `MarkerStore`: where the durable session marker (refresh cookie) lives
//! - `silent_reauth`: restore or refresh a session from the marker
//! - `RouteGuard`: the checking / authenticated / unauthenticated state machine
//! - `login` / `logout` and the `Session` that owns all of the above

pub mod credentials;
pub mod guard;
pub mod login;
pub mod logout;
pub mod marker;
pub mod preference;
pub mod reauth;
pub mod session;

pub use credentials::CredentialStore;
pub use guard::{Access, GuardState, RouteGuard};
pub use login::{login, LoginError, LoginRedirect};
pub use logout::logout;
pub use marker::{KeyringMarkerStore, MarkerStore, MemoryMarkerStore};
pub use preference::{PreferenceStore, PERSIST_KEY};
pub use reauth::{refresh_with_timeout, silent_reauth};
pub use session::Session;
