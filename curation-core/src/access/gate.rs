use std::sync::Arc;

use curation_repository::RoleRepository;
use curation_shared::types::{ADMIN_ROLE, Permission, User, UserStatus};
use tracing::{instrument, warn};

use super::PermissionResolver;
use crate::errors::{CoreError, ForbiddenReason};

/// Guards protected operations.
///
/// Every decision runs the account-status check first, so banned and
/// suspended users are rejected before any role or permission lookup.
pub struct AuthorizationGate {
    resolver: PermissionResolver,
}

impl AuthorizationGate {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self {
            resolver: PermissionResolver::new(roles),
        }
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Rejects users whose account is not active.
    pub fn check_status(&self, user: &User) -> Result<(), CoreError> {
        let reason = match user.status {
            UserStatus::Active => return Ok(()),
            UserStatus::Banned => ForbiddenReason::AccountBanned,
            UserStatus::Suspended => ForbiddenReason::AccountSuspended,
        };
        Err(Self::deny(user, reason))
    }

    /// Allows the request iff the user's role grants `permission`.
    ///
    /// Users holding the `Admin` role are allowed every permission without a
    /// lookup, whether or not an `Admin` role definition exists.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The user may proceed
    /// * `Err(CoreError::Forbidden)` - With `AccountBanned`, `AccountSuspended`,
    ///   `RoleNotFound` or `PermissionMissing` as the reason
    /// * `Err(CoreError::RoleRepository)` - The role store could not be read
    #[instrument(skip(self, user), fields(user_id = %user.id, role = %user.role))]
    pub async fn authorize(&self, user: &User, permission: Permission) -> Result<(), CoreError> {
        self.check_status(user)?;

        if user.role == ADMIN_ROLE {
            return Ok(());
        }

        let permissions = match self.resolver.resolve_permissions(&user.role).await {
            Ok(permissions) => permissions,
            Err(CoreError::RoleNotFound(role)) => {
                return Err(Self::deny(user, ForbiddenReason::RoleNotFound(role)));
            }
            Err(e) => return Err(e),
        };

        if permissions.contains(&permission) {
            Ok(())
        } else {
            Err(Self::deny(
                user,
                ForbiddenReason::PermissionMissing {
                    role: user.role.clone(),
                    permission,
                },
            ))
        }
    }

    /// Same as [`AuthorizationGate::authorize`] for a permission given by its
    /// wire name. Unknown names fail with `InvalidPermission`.
    pub async fn authorize_named(&self, user: &User, permission: &str) -> Result<(), CoreError> {
        let permission = permission.parse::<Permission>()?;
        self.authorize(user, permission).await
    }

    /// Allows the request iff the user's role is one of `allowed_roles`.
    ///
    /// Independent of the permission catalog and of role definitions.
    pub fn authorize_any_of(&self, user: &User, allowed_roles: &[&str]) -> Result<(), CoreError> {
        self.check_status(user)?;

        if allowed_roles.contains(&user.role.as_str()) {
            return Ok(());
        }
        Err(Self::deny(
            user,
            ForbiddenReason::RoleNotAllowed {
                role: user.role.clone(),
                allowed: allowed_roles.iter().map(|r| r.to_string()).collect(),
            },
        ))
    }

    fn deny(user: &User, reason: ForbiddenReason) -> CoreError {
        warn!(user_id = %user.id, role = %user.role, reason = %reason, "Access denied");
        CoreError::Forbidden(reason)
    }
}
