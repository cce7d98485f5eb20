//! # Curation Shared
//! This crate defines the domain types shared across the curation platform core.
//! It includes votes and vote transitions, vote tallies, the permission catalog,
//! roles and the user view consulted by the authorization gate.
pub mod errors;
pub mod types;

pub use errors::ParseError;
