//! User account models and the request bodies that create or modify them.

use serde::{Deserialize, Serialize};

use super::role::{has_role, Role, ADMIN_ROLE};

/// Account status as stored by the server: `1` enabled, anything else disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum UserStatus {
    Enabled,
    Disabled,
}

impl From<i32> for UserStatus {
    fn from(value: i32) -> Self {
        if value == 1 {
            UserStatus::Enabled
        } else {
            UserStatus::Disabled
        }
    }
}

impl From<UserStatus> for i32 {
    fn from(status: UserStatus) -> Self {
        match status {
            UserStatus::Enabled => 1,
            UserStatus::Disabled => 0,
        }
    }
}

impl UserStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Enabled => "Enabled",
            UserStatus::Disabled => "Disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<Role>,
}

/// The logged-in user as seen by the session.
pub type Identity = User;

impl User {
    pub fn has_role(&self, name: &str) -> bool {
        has_role(&self.roles, name)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.status, Some(UserStatus::Enabled))
    }

    pub fn status_text(&self) -> &'static str {
        self.status.unwrap_or(UserStatus::Disabled).label()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Role>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    #[serde(default)]
    pub total_users: i64,
    #[serde(default)]
    pub enabled_users: i64,
    #[serde(default)]
    pub disabled_users: i64,
    #[serde(default)]
    pub enabled_percentage: f64,
}

/// Filters for the paged user list.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub page: u32,
    pub size: u32,
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub role_id: Option<i64>,
}

impl UserQuery {
    /// Page size used when the caller leaves it at zero
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    pub fn to_params(&self) -> Vec<(String, String)> {
        let size = if self.size == 0 {
            Self::DEFAULT_PAGE_SIZE
        } else {
            self.size
        };
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), size.to_string()),
        ];
        if let Some(ref search) = self.search {
            if !search.trim().is_empty() {
                params.push(("search".to_string(), search.trim().to_string()));
            }
        }
        if let Some(status) = self.status {
            params.push(("status".to_string(), i32::from(status).to_string()));
        }
        if let Some(role_id) = self.role_id {
            params.push(("roleId".to_string(), role_id.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub status: UserStatus,
    pub roles: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
