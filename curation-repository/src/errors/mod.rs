//! Error types for the curation repository.
//! Consolidates and re-exports error types related to vote and role persistence.
mod roles;
mod votes;

pub use roles::RoleRepositoryError;
pub use votes::VoteRepositoryError;
