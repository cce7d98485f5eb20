//! This module defines the `RoleService`, which validates role definitions
//! before they reach the role repository.
use std::sync::Arc;

use chrono::Utc;
use curation_repository::RoleRepository;
use curation_shared::types::{
    parse_permissions, system_roles, Permission, Role, RoleId, RoleInput, USER_ROLE,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::CoreError;

/// Longest accepted role name, in characters.
const MAX_ROLE_NAME_LEN: usize = 64;

/// Creates, edits and removes role definitions.
pub struct RoleService {
    repository: Arc<dyn RoleRepository>,
    default_role: String,
}

impl RoleService {
    /// Creates a new `RoleService` that moves users of deleted roles to `User`.
    pub fn new(repository: Arc<dyn RoleRepository>) -> Self {
        Self::with_default_role(repository, USER_ROLE)
    }

    pub fn with_default_role(
        repository: Arc<dyn RoleRepository>,
        default_role: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            default_role: default_role.into(),
        }
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, CoreError> {
        Ok(self.repository.list_roles().await?)
    }

    pub async fn get_role(&self, id: RoleId) -> Result<Role, CoreError> {
        self.repository
            .find_role_by_id(id)
            .await?
            .ok_or(CoreError::RoleIdNotFound(id))
    }

    /// Creates a custom (non-system) role.
    ///
    /// # Returns
    ///
    /// * `Ok(Role)` - The stored role
    /// * `Err(CoreError::InvalidRoleName)` - The trimmed name is empty, too long or
    ///   reserved for a system role
    /// * `Err(CoreError::InvalidPermission)` - A permission string is outside the catalog
    /// * `Err(CoreError::DuplicateRoleName)` - Another role already has this name
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_role(&self, input: RoleInput) -> Result<Role, CoreError> {
        let (name, permissions) = validate(&input)?;
        ensure_not_reserved(&name)?;
        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            name,
            description: input.description,
            permissions,
            is_system: false,
            created_at: now,
            updated_at: now,
        };

        self.repository.insert_role(&role).await?;
        info!(role_id = %role.id, "Role created");
        Ok(role)
    }

    /// Replaces a role's name, description and permissions.
    ///
    /// Renaming rewrites the role name stored on every affected user. System
    /// roles keep their name but their description and permissions may change.
    #[instrument(skip(self, input), fields(role_id = %id))]
    pub async fn update_role(&self, id: RoleId, input: RoleInput) -> Result<Role, CoreError> {
        let mut role = self.get_role(id).await?;
        let (name, permissions) = validate(&input)?;

        if role.is_system && role.name != name {
            return Err(CoreError::SystemRoleProtected {
                name: role.name,
                action: "rename",
            });
        }
        if !role.is_system {
            ensure_not_reserved(&name)?;
        }

        role.name = name;
        role.description = input.description;
        role.permissions = permissions;
        role.updated_at = Utc::now();

        let renamed_users = self.repository.update_role(&role).await?;
        info!(name = %role.name, renamed_users, "Role updated");
        Ok(role)
    }

    /// Deletes a custom role, moving its users to the default role.
    ///
    /// The default role itself cannot be deleted, and nothing is deleted while
    /// the default role is undefined.
    ///
    /// Returns the number of reassigned users.
    #[instrument(skip(self), fields(role_id = %id))]
    pub async fn delete_role(&self, id: RoleId) -> Result<u64, CoreError> {
        let reassigned = self.repository.delete_role(id, &self.default_role).await?;
        info!(
            reassigned,
            default_role = %self.default_role,
            "Role deleted"
        );
        Ok(reassigned)
    }

    /// Inserts the system roles that are not defined yet.
    ///
    /// Existing roles are left untouched, so running this repeatedly is safe.
    /// Returns the roles that were inserted.
    pub async fn seed_system_roles(&self) -> Result<Vec<Role>, CoreError> {
        let mut seeded = Vec::new();
        for system_role in system_roles() {
            if self
                .repository
                .find_role_by_name(system_role.name)
                .await?
                .is_some()
            {
                continue;
            }

            let now = Utc::now();
            let role = Role {
                id: Uuid::new_v4(),
                name: system_role.name.to_string(),
                description: system_role.description.to_string(),
                permissions: system_role.permissions,
                is_system: true,
                created_at: now,
                updated_at: now,
            };
            self.repository.insert_role(&role).await?;
            info!(name = %role.name, "Seeded system role");
            seeded.push(role);
        }
        Ok(seeded)
    }
}

fn validate(input: &RoleInput) -> Result<(String, Vec<Permission>), CoreError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidRoleName("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_ROLE_NAME_LEN {
        return Err(CoreError::InvalidRoleName(format!(
            "name must be at most {MAX_ROLE_NAME_LEN} characters"
        )));
    }
    let permissions = parse_permissions(&input.permissions)?;
    Ok((name.to_string(), permissions))
}

/// System role names carry meaning to the gate and the seeder, so custom roles
/// may not take them even before the system roles are seeded.
fn ensure_not_reserved(name: &str) -> Result<(), CoreError> {
    if system_roles().iter().any(|r| r.name == name) {
        return Err(CoreError::InvalidRoleName(format!(
            "'{name}' is reserved for a system role"
        )));
    }
    Ok(())
}
