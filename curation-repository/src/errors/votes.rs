//! Error types for the vote repository.
//! Defines specific errors that can occur during database operations related to votes.
use curation_shared::types::{TargetId, TargetKind, UserId};
use thiserror::Error;

/// Represents errors that can occur within the vote repository.
#[derive(Debug, Error)]
pub enum VoteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("{kind} {id} not found")]
    TargetNotFound { kind: TargetKind, id: TargetId },

    /// Another request inserted the same (voter, target) vote first.
    #[error("Vote by {voter_id} on {kind} {target_id} already exists")]
    DuplicateVote {
        voter_id: UserId,
        target_id: TargetId,
        kind: TargetKind,
    },

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(i16),

    #[error("Invalid target kind: {0}")]
    InvalidTargetKind(i16),
}

impl VoteRepositoryError {
    /// Whether re-reading state and retrying the operation can resolve the error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VoteRepositoryError::DuplicateVote { .. })
    }
}
