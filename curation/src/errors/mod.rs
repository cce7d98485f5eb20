//! Error types for the curation binary.
//! Consolidates failures from configuration, the database and the core services.
use curation_core::CoreError;
use curation_repository::{RoleRepositoryError, VoteRepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Vote repository error: {0}")]
    VoteRepository(#[from] VoteRepositoryError),
    #[error("Role repository error: {0}")]
    RoleRepository(#[from] RoleRepositoryError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
