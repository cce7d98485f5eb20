//! This module defines and re-exports the interfaces for the curation repository.
//! It serves as a central point for accessing traits related to data interaction.
mod roles;
mod votes;

pub use roles::RoleRepository;
pub use votes::VoteRepository;
