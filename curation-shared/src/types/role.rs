use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Permission, RoleId};

/// Name of the super-user role. Users holding it bypass permission lookups.
pub const ADMIN_ROLE: &str = "Admin";
/// Name of the seeded moderation role.
pub const MODERATOR_ROLE: &str = "Moderator";
/// Name of the seeded role every new account starts with.
pub const USER_ROLE: &str = "User";

/// Represents a named bundle of permissions.
///
/// System roles are seeded defaults: their name is fixed and they cannot be
/// deleted, although their description and permissions remain editable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    pub permissions: Vec<Permission>,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// The body accepted by role create and update requests.
///
/// Permissions arrive as raw strings and are validated against the catalog
/// before anything is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A seeded system role definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRole {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: Vec<Permission>,
}

/// The system roles every deployment starts with.
pub fn system_roles() -> Vec<SystemRole> {
    use Permission::*;

    vec![
        SystemRole {
            name: ADMIN_ROLE,
            description: "Full access to every administrative operation",
            permissions: Permission::ALL.to_vec(),
        },
        SystemRole {
            name: MODERATOR_ROLE,
            description: "Reviews submissions and handles reports",
            permissions: vec![
                WebsiteView,
                WebsiteEdit,
                WebsiteApprove,
                UserView,
                UserSuspend,
                ReportView,
                ReportResolve,
                CategoryView,
                AuditView,
            ],
        },
        SystemRole {
            name: USER_ROLE,
            description: "Default role for registered users",
            permissions: vec![WebsiteView, WebsiteCreate, CategoryView],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_roles_are_unique_and_admin_holds_catalog() {
        let roles = system_roles();
        let names: Vec<_> = roles.iter().map(|r| r.name).collect();
        assert_eq!(names, vec![ADMIN_ROLE, MODERATOR_ROLE, USER_ROLE]);
        assert_eq!(roles[0].permissions.len(), Permission::ALL.len());
    }

    #[test]
    fn test_role_input_defaults_optional_fields() {
        let input: RoleInput = serde_json::from_str(r#"{"name":"Editor"}"#).unwrap();
        assert_eq!(input.name, "Editor");
        assert!(input.description.is_empty());
        assert!(input.permissions.is_empty());
    }
}
