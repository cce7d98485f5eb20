//! # Curation Repository
//! This crate provides traits and implementations for interacting with the
//! vote ledger, the counter projection and role definitions. It includes
//! definitions for errors, interfaces, a PostgreSQL implementation and an
//! in-memory implementation used by tests and local tooling.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::{RoleRepositoryError, VoteRepositoryError};
pub use interfaces::{RoleRepository, VoteRepository};
pub use memory::{InMemoryRoleRepository, InMemoryVoteRepository};
pub use postgres::{PostgresRoleRepository, PostgresVoteRepository, MIGRATOR};
