//! In-memory implementations of the curation repositories.
//!
//! They honour the same contracts as the PostgreSQL implementations (atomic
//! casts, rename and delete propagation to users) and back the unit tests
//! that should not need a database.
mod roles;
mod votes;

pub use roles::InMemoryRoleRepository;
pub use votes::InMemoryVoteRepository;
