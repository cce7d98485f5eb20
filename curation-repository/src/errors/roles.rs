use curation_shared::types::RoleId;
use thiserror::Error;

/// Represents errors that can occur within the role repository.
#[derive(Debug, Error)]
pub enum RoleRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Role {0} not found")]
    RoleNotFound(RoleId),

    #[error("Role name already taken: {0}")]
    DuplicateRoleName(String),

    #[error("System role {0} cannot be deleted")]
    SystemRoleProtected(String),

    /// The role being deleted is the one its users would be moved to.
    #[error("Default role {0} cannot be deleted")]
    DefaultRoleProtected(String),

    /// The role that users of a deleted role move to is not defined.
    #[error("Default role {0} is not defined")]
    DefaultRoleMissing(String),

    /// A stored permission string no longer belongs to the catalog.
    #[error("Invalid stored permission: {0}")]
    InvalidPermission(String),
}
