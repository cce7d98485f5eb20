//! Error types for the curation core.
//!
//! Every operation returns `CoreError`. Callers translating errors into HTTP
//! responses should go through [`CoreError::kind`] so that distinct causes
//! (for example a missing role versus a missing permission) stay distinct.
use curation_repository::{RoleRepositoryError, VoteRepositoryError};
use curation_shared::ParseError;
use curation_shared::types::{Permission, RoleId, TargetId, TargetKind};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a `CoreError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    Forbidden,
    Internal,
}

impl ErrorKind {
    /// The HTTP status code this kind maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidArgument => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::Forbidden => 403,
            ErrorKind::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Why the authorization gate denied a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForbiddenReason {
    #[error("Your account has been banned")]
    AccountBanned,

    #[error("Your account has been suspended")]
    AccountSuspended,

    /// The user's role name does not resolve to a role definition.
    #[error("Role '{0}' is not defined")]
    RoleNotFound(String),

    #[error("Role '{role}' does not have the {permission} permission")]
    PermissionMissing { role: String, permission: Permission },

    #[error("Role '{role}' is not allowed, requires one of: {}", .allowed.join(", "))]
    RoleNotAllowed { role: String, allowed: Vec<String> },
}

/// Represents errors that can occur within the curation core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{kind} {id} not found")]
    TargetNotFound { kind: TargetKind, id: TargetId },

    #[error("Role '{0}' not found")]
    RoleNotFound(String),

    #[error("Role {0} not found")]
    RoleIdNotFound(RoleId),

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(String),

    #[error("Invalid permission: {0}")]
    InvalidPermission(String),

    #[error("Invalid role name: {0}")]
    InvalidRoleName(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A uniqueness race on the vote ledger persisted through every retry.
    #[error("Concurrent votes on {kind} {id} could not be reconciled")]
    VoteConflict { kind: TargetKind, id: TargetId },

    #[error("Role name already taken: {0}")]
    DuplicateRoleName(String),

    #[error("Access denied: {0}")]
    Forbidden(#[from] ForbiddenReason),

    #[error("Cannot {action} system role '{name}'")]
    SystemRoleProtected { name: String, action: &'static str },

    #[error("Cannot delete role '{0}': it is the default role for reassigned users")]
    DefaultRoleProtected(String),

    /// The configured default role has no definition, so deleting a role
    /// would leave its users on an unknown role.
    #[error("Default role '{0}' is not defined")]
    DefaultRoleMissing(String),

    #[error("Vote repository error: {0}")]
    VoteRepository(VoteRepositoryError),

    #[error("Role repository error: {0}")]
    RoleRepository(RoleRepositoryError),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::TargetNotFound { .. }
            | CoreError::RoleNotFound(_)
            | CoreError::RoleIdNotFound(_) => ErrorKind::NotFound,
            CoreError::InvalidVoteType(_)
            | CoreError::InvalidPermission(_)
            | CoreError::InvalidRoleName(_)
            | CoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CoreError::VoteConflict { .. }
            | CoreError::DuplicateRoleName(_)
            | CoreError::DefaultRoleMissing(_) => ErrorKind::Conflict,
            CoreError::Forbidden(_)
            | CoreError::SystemRoleProtected { .. }
            | CoreError::DefaultRoleProtected(_) => ErrorKind::Forbidden,
            CoreError::VoteRepository(_) | CoreError::RoleRepository(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// The gate denial behind this error, if any.
    pub fn forbidden_reason(&self) -> Option<&ForbiddenReason> {
        match self {
            CoreError::Forbidden(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<VoteRepositoryError> for CoreError {
    fn from(err: VoteRepositoryError) -> Self {
        match err {
            VoteRepositoryError::TargetNotFound { kind, id } => CoreError::TargetNotFound { kind, id },
            VoteRepositoryError::DuplicateVote {
                target_id, kind, ..
            } => CoreError::VoteConflict {
                kind,
                id: target_id,
            },
            other => CoreError::VoteRepository(other),
        }
    }
}

impl From<RoleRepositoryError> for CoreError {
    fn from(err: RoleRepositoryError) -> Self {
        match err {
            RoleRepositoryError::RoleNotFound(id) => CoreError::RoleIdNotFound(id),
            RoleRepositoryError::DuplicateRoleName(name) => CoreError::DuplicateRoleName(name),
            RoleRepositoryError::SystemRoleProtected(name) => CoreError::SystemRoleProtected {
                name,
                action: "delete",
            },
            RoleRepositoryError::DefaultRoleProtected(name) => CoreError::DefaultRoleProtected(name),
            RoleRepositoryError::DefaultRoleMissing(name) => CoreError::DefaultRoleMissing(name),
            other => CoreError::RoleRepository(other),
        }
    }
}

impl From<ParseError> for CoreError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::InvalidVoteDirection(value) => CoreError::InvalidVoteType(value),
            ParseError::InvalidPermission(value) => CoreError::InvalidPermission(value),
            other => CoreError::InvalidArgument(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_kinds_map_to_status_codes() {
        let not_found = CoreError::TargetNotFound {
            kind: TargetKind::Website,
            id: Uuid::new_v4(),
        };
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(CoreError::InvalidVoteType("sideways".into()).status_code(), 400);
        assert_eq!(CoreError::DuplicateRoleName("Editor".into()).status_code(), 409);
        assert_eq!(
            CoreError::from(ForbiddenReason::AccountBanned).status_code(),
            403
        );
        assert_eq!(
            CoreError::SystemRoleProtected {
                name: "Admin".into(),
                action: "rename"
            }
            .status_code(),
            403
        );
    }

    #[test]
    fn test_denials_stay_distinct() {
        let missing_role = CoreError::from(ForbiddenReason::RoleNotFound("Ghost".into()));
        let missing_permission = CoreError::from(ForbiddenReason::PermissionMissing {
            role: "Editor".into(),
            permission: Permission::UserBan,
        });

        assert_eq!(missing_role.kind(), missing_permission.kind());
        assert_ne!(missing_role.forbidden_reason(), missing_permission.forbidden_reason());
        assert_eq!(missing_role.to_string(), "Access denied: Role 'Ghost' is not defined");
        assert_eq!(
            missing_permission.to_string(),
            "Access denied: Role 'Editor' does not have the USER_BAN permission"
        );
    }

    #[test]
    fn test_role_not_allowed_lists_roles() {
        let reason = ForbiddenReason::RoleNotAllowed {
            role: "User".into(),
            allowed: vec!["Admin".into(), "Moderator".into()],
        };
        assert_eq!(
            reason.to_string(),
            "Role 'User' is not allowed, requires one of: Admin, Moderator"
        );
    }

    #[test]
    fn test_repository_errors_are_classified() {
        let duplicate = CoreError::from(VoteRepositoryError::DuplicateVote {
            voter_id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            kind: TargetKind::Comment,
        });
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);

        let protected = CoreError::from(RoleRepositoryError::SystemRoleProtected("User".into()));
        assert_eq!(protected.to_string(), "Cannot delete system role 'User'");

        let internal = CoreError::from(VoteRepositoryError::InvalidVoteType(7));
        assert_eq!(internal.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_parse_errors_are_invalid_arguments() {
        let err = CoreError::from(ParseError::InvalidPermission("USER_PROMOTE".into()));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "Invalid permission: USER_PROMOTE");
    }
}
