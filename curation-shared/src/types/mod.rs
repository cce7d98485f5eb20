mod permission;
mod role;
mod transition;
mod user;
mod vote;
mod votes_count;

pub use permission::{parse_permissions, Permission, PermissionModule};
pub use role::{system_roles, Role, RoleInput, SystemRole, ADMIN_ROLE, MODERATOR_ROLE, USER_ROLE};
pub use transition::{VoteTransition, VotesDelta};
pub use user::{User, UserStatus};
pub use vote::{TargetKind, Vote, VoteDirection};
pub use votes_count::{CounterDrift, VoteOutcome, VotesCount};

use uuid::Uuid;

pub type UserId = Uuid;
pub type TargetId = Uuid;
pub type RoleId = Uuid;
