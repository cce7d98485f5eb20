//! Errors raised when converting wire strings into domain types.
use thiserror::Error;

/// Represents a string that does not name a known domain value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid vote type: {0}")]
    InvalidVoteDirection(String),

    #[error("Invalid target kind: {0}")]
    InvalidTargetKind(String),

    #[error("Invalid permission: {0}")]
    InvalidPermission(String),

    #[error("Invalid user status: {0}")]
    InvalidUserStatus(String),
}
