//! PostgreSQL implementations of the curation repositories.
//!
//! Migrations live next to this module and are embedded in [`MIGRATOR`].
mod roles_repository;
mod votes_repository;

pub use roles_repository::PostgresRoleRepository;
pub use votes_repository::PostgresVoteRepository;

/// Embedded schema migrations for the vote ledger and role tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./src/postgres/migrations");
