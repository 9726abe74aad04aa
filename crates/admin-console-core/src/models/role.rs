use serde::{Deserialize, Serialize};

/// Name of the role that grants administrative access.
/// Matching is exact and case-sensitive.
pub const ADMIN_ROLE: &str = "ADMIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Role {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Body for creating or updating a role.
#[derive(Debug, Clone, Serialize)]
pub struct NewRole {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Check whether a role set contains a role with exactly this name
pub fn has_role(roles: &[Role], name: &str) -> bool {
    roles.iter().any(|role| role.name == name)
}

/// Format a role set for display, e.g. "ADMIN, USER"
pub fn format_roles(roles: &[Role]) -> String {
    if roles.is_empty() {
        return "No roles".to_string();
    }
    roles
        .iter()
        .map(|role| role.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
