//! Accounts, credentials, and role profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of an account; decides which dashboard a session lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Customer,
    Provider,
    Admin,
    #[serde(other)]
    Unknown,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Provider => "provider",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user as returned by `/me/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    /// Full name when known, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }

    pub fn is_provider(&self) -> bool {
        self.user_type == UserType::Provider
    }
}

/// Username/password login body for `POST /token/`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Access/refresh token pair issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Sign-up body for `POST /register/`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Third-party login body for `POST /auth/social/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct SocialLogin {
    pub provider: String,
    pub access_token: String,
}

/// Body for `POST /auth/change-password/`.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

/// A service provider's profile (admin view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: i64,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub service: Option<serde_json::Value>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_jobs_completed: u32,
}

/// A customer's profile (admin and self-service view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: i64,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// An administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: i64,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "superAdmin", default)]
    pub super_admin: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_me_payload() {
        let json = serde_json::json!({
            "id": 3,
            "username": "kiran",
            "first_name": "Kiran",
            "last_name": "",
            "user_type": "provider"
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.is_provider());
        assert_eq!(user.display_name(), "Kiran");
    }

    #[test]
    fn test_unknown_user_type() {
        let json = serde_json::json!({"id": 1, "username": "ops", "user_type": "auditor"});
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.user_type, UserType::Unknown);
        assert_eq!(user.display_name(), "ops");
    }

    #[test]
    fn test_admin_profile_field_names() {
        let json = serde_json::json!({"id": 2, "phone": "555", "superAdmin": true});
        let admin: AdminProfile = serde_json::from_value(json).unwrap();
        assert!(admin.super_admin);
    }
}
