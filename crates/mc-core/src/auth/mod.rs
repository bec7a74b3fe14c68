//! Authentication models shared by the session use case and the HTTP client.

use serde::{Deserialize, Serialize};

mod jwt;

pub use jwt::cognito_username_from_jwt;

/// What the rest of the app knows about authentication at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    /// The session is still being restored or a login is in flight.
    pub loading: bool,
    pub authenticated: bool,
}

impl AuthSnapshot {
    pub const fn resolving() -> Self {
        Self {
            loading: true,
            authenticated: false,
        }
    }

    pub const fn signed_in() -> Self {
        Self {
            loading: false,
            authenticated: true,
        }
    }

    pub const fn signed_out() -> Self {
        Self {
            loading: false,
            authenticated: false,
        }
    }
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self::resolving()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub organization_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognito_username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub tokens: AuthTokens,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials = LoginCredentials {
            email: "owner@example.com".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("owner@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn default_snapshot_is_resolving() {
        assert_eq!(AuthSnapshot::default(), AuthSnapshot::resolving());
    }
}
