use std::collections::HashMap;

use async_trait::async_trait;
use curation_shared::types::{Role, RoleId, User, UserId};
use tokio::sync::Mutex;

use crate::{RoleRepository, RoleRepositoryError};

#[derive(Default)]
struct RoleState {
    roles: Vec<Role>,
    users: HashMap<UserId, User>,
}

/// Role repository held entirely in memory, together with the users whose
/// role names it must keep consistent.
#[derive(Default)]
pub struct InMemoryRoleRepository {
    state: Mutex<RoleState>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    pub async fn user(&self, id: UserId) -> Option<User> {
        self.state.lock().await.users.get(&id).cloned()
    }

    fn rename_users(users: &mut HashMap<UserId, User>, from: &str, to: &str) -> u64 {
        let mut renamed = 0;
        for user in users.values_mut().filter(|u| u.role == from) {
            user.role = to.to_string();
            renamed += 1;
        }
        renamed
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn list_roles(&self) -> Result<Vec<Role>, RoleRepositoryError> {
        Ok(self.state.lock().await.roles.clone())
    }

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<Role>, RoleRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, RoleRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn insert_role(&self, role: &Role) -> Result<(), RoleRepositoryError> {
        let mut state = self.state.lock().await;
        if state.roles.iter().any(|r| r.name == role.name) {
            return Err(RoleRepositoryError::DuplicateRoleName(role.name.clone()));
        }
        state.roles.push(role.clone());
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> Result<u64, RoleRepositoryError> {
        let mut state = self.state.lock().await;
        if state
            .roles
            .iter()
            .any(|r| r.id != role.id && r.name == role.name)
        {
            return Err(RoleRepositoryError::DuplicateRoleName(role.name.clone()));
        }

        let stored = state
            .roles
            .iter_mut()
            .find(|r| r.id == role.id)
            .ok_or(RoleRepositoryError::RoleNotFound(role.id))?;
        let previous_name = std::mem::replace(&mut stored.name, role.name.clone());
        stored.description = role.description.clone();
        stored.permissions = role.permissions.clone();
        stored.updated_at = role.updated_at;

        if previous_name == role.name {
            return Ok(0);
        }
        Ok(Self::rename_users(&mut state.users, &previous_name, &role.name))
    }

    async fn delete_role(&self, id: RoleId, fallback_role: &str) -> Result<u64, RoleRepositoryError> {
        let mut state = self.state.lock().await;
        let index = state
            .roles
            .iter()
            .position(|r| r.id == id)
            .ok_or(RoleRepositoryError::RoleNotFound(id))?;
        if state.roles[index].is_system {
            return Err(RoleRepositoryError::SystemRoleProtected(
                state.roles[index].name.clone(),
            ));
        }
        if state.roles[index].name == fallback_role {
            return Err(RoleRepositoryError::DefaultRoleProtected(fallback_role.to_string()));
        }
        if !state.roles.iter().any(|r| r.name == fallback_role) {
            return Err(RoleRepositoryError::DefaultRoleMissing(fallback_role.to_string()));
        }

        let removed = state.roles.remove(index);
        Ok(Self::rename_users(&mut state.users, &removed.name, fallback_role))
    }
}
