//! Role-based access control.
//!
//! [`PermissionResolver`] is a pure lookup from a role name to its permission
//! set. [`AuthorizationGate`] composes the account-status check, the Admin
//! override and the resolver into allow/deny decisions.
mod gate;
mod resolver;

pub use gate::AuthorizationGate;
pub use resolver::PermissionResolver;
