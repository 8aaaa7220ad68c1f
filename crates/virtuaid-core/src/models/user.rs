use serde::Deserialize;
use tracing::warn;

/// Primary role of a signed-in user.
///
/// The backend reports three independent flags. They are folded into a single
/// role with precedence SuperAdmin > Admin > Manager; no flag set is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    #[default]
    None,
}

impl Role {
    pub fn from_flags(is_superadmin: bool, is_admin: bool, is_manager: bool) -> Self {
        let set = [is_superadmin, is_admin, is_manager]
            .iter()
            .filter(|f| **f)
            .count();
        if set > 1 {
            warn!(
                is_superadmin,
                is_admin,
                is_manager,
                "User holds more than one role, using the highest"
            );
        }

        if is_superadmin {
            Role::SuperAdmin
        } else if is_admin {
            Role::Admin
        } else if is_manager {
            Role::Manager
        } else {
            Role::None
        }
    }

    /// Managers may not sign in to the admin console.
    pub fn can_use_console(&self) -> bool {
        !matches!(self, Role::Manager)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::None => "No role",
        }
    }
}

/// The current authenticated identity.
///
/// `Credential::default()` is the empty (signed out) credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credential {
    pub access_token: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

impl Credential {
    /// A protected view is reachable only when an email is known.
    pub fn is_authenticated(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Build a credential from a profile response and the token used to fetch it.
    pub fn from_profile(access_token: String, profile: UserProfile) -> Self {
        let role = profile.role();
        Self {
            access_token: Some(access_token),
            name: profile.name,
            email: profile.email,
            role,
        }
    }
}

/// Response of `POST /auth/token/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_superadmin: bool,
    #[serde(default)]
    pub is_manager: bool,
}

impl LoginResponse {
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_superadmin, self.is_admin, self.is_manager)
    }
}

/// Response of `POST /auth/token/refresh/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: Option<String>,
}

/// Response of `GET /auth/user/`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_superadmin: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_manager: bool,
}

impl UserProfile {
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_superadmin, self.is_admin, self.is_manager)
    }
}
