//! # Curation Core
//!
//! The consistency and access-control core of the curation platform.
//!
//! ## Modules
//!
//! - [`ledger`]: casts votes and keeps the counter projection in step with the vote ledger
//! - [`access`]: resolves role permissions and gates protected operations
//! - [`roles`]: validates and manages role definitions
//! - [`errors`]: the error taxonomy shared by every operation
pub mod access;
pub mod errors;
pub mod ledger;
pub mod roles;

pub use access::{AuthorizationGate, PermissionResolver};
pub use errors::{CoreError, ErrorKind, ForbiddenReason};
pub use ledger::{VoteLedger, VoteLedgerConfig};
pub use roles::RoleService;
