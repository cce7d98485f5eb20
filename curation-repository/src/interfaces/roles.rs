use crate::errors::RoleRepositoryError;
use curation_shared::types::{Role, RoleId};

/// Trait for interacting with role definitions.
///
/// Users reference roles by name, so renames and deletions also rewrite the
/// role name stored on affected users, inside the same transaction.
#[async_trait::async_trait]
pub trait RoleRepository: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<Role>, RoleRepositoryError>;

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<Role>, RoleRepositoryError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, RoleRepositoryError>;

    /// Inserts a new role. Fails with `DuplicateRoleName` if the name is taken.
    async fn insert_role(&self, role: &Role) -> Result<(), RoleRepositoryError>;

    /// Replaces a role's name, description and permissions.
    ///
    /// Returns the number of users whose stored role name was rewritten by a rename.
    async fn update_role(&self, role: &Role) -> Result<u64, RoleRepositoryError>;

    /// Deletes a non-system role and moves its users to `fallback_role`.
    ///
    /// Fails with `DefaultRoleProtected` when the role is `fallback_role` itself
    /// and with `DefaultRoleMissing` when `fallback_role` is not defined, so
    /// users are never moved to a name without a definition.
    ///
    /// Returns the number of reassigned users.
    async fn delete_role(&self, id: RoleId, fallback_role: &str) -> Result<u64, RoleRepositoryError>;
}
