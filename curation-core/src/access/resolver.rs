use std::collections::BTreeSet;
use std::sync::Arc;

use curation_repository::RoleRepository;
use curation_shared::types::Permission;
use tracing::debug;

use crate::errors::CoreError;

/// Maps a role name to the permissions its definition grants.
pub struct PermissionResolver {
    roles: Arc<dyn RoleRepository>,
}

impl PermissionResolver {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// Resolves the permission set of `role_name`.
    ///
    /// No role receives special treatment here, `Admin` included.
    ///
    /// # Returns
    ///
    /// * `Ok(BTreeSet<Permission>)` - The permissions listed on the role definition
    /// * `Err(CoreError::RoleNotFound)` - No role with that name is defined
    pub async fn resolve_permissions(
        &self,
        role_name: &str,
    ) -> Result<BTreeSet<Permission>, CoreError> {
        let role = self
            .roles
            .find_role_by_name(role_name)
            .await?
            .ok_or_else(|| CoreError::RoleNotFound(role_name.to_string()))?;

        debug!(role = %role.name, permissions = role.permissions.len(), "Resolved role permissions");
        Ok(role.permissions.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use curation_repository::InMemoryRoleRepository;
    use curation_shared::types::Role;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_resolves_listed_permissions() {
        let repository = Arc::new(InMemoryRoleRepository::new());
        let now = Utc::now();
        repository
            .insert_role(&Role {
                id: Uuid::new_v4(),
                name: "Editor".to_string(),
                description: String::new(),
                permissions: vec![Permission::CategoryManage, Permission::WebsiteView],
                is_system: false,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let resolver = PermissionResolver::new(repository);

        let permissions = resolver.resolve_permissions("Editor").await.unwrap();

        assert_eq!(
            permissions,
            BTreeSet::from([Permission::WebsiteView, Permission::CategoryManage])
        );
    }

    #[tokio::test]
    async fn test_admin_is_not_special_cased() {
        let resolver = PermissionResolver::new(Arc::new(InMemoryRoleRepository::new()));

        let err = resolver.resolve_permissions("Admin").await.unwrap_err();

        assert!(matches!(err, CoreError::RoleNotFound(ref name) if name == "Admin"));
    }
}
