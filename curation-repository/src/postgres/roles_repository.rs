//! PostgreSQL implementation of the role repository.
//!
//! Roles live in the `roles` table; users carry the role name in `users.role`.
//! Renames and deletions rewrite that column in the same transaction so no user
//! is left pointing at a role that no longer exists.
use async_trait::async_trait;
use curation_shared::types::{Permission, Role, RoleId};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::{RoleRepository, RoleRepositoryError};

/// PostgreSQL-backed role repository.
pub struct PostgresRoleRepository {
    pool: sqlx::PgPool,
}

const ROLE_COLUMNS: &str = "id, name, description, permissions, is_system, created_at, updated_at";

fn role_from_row(row: &PgRow) -> Result<Role, RoleRepositoryError> {
    let stored: Vec<String> = row.try_get("permissions")?;
    let permissions = stored
        .into_iter()
        .map(|value| {
            value
                .parse::<Permission>()
                .map_err(|_| RoleRepositoryError::InvalidPermission(value))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Role {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        permissions,
        is_system: row.try_get("is_system")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn permission_names(role: &Role) -> Vec<String> {
    role.permissions.iter().map(|p| p.as_str().to_string()).collect()
}

fn map_name_conflict(e: sqlx::Error, name: &str) -> RoleRepositoryError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            RoleRepositoryError::DuplicateRoleName(name.to_string())
        }
        other => RoleRepositoryError::DatabaseError(other),
    }
}

impl PostgresRoleRepository {
    /// Creates a new PostgreSQL role repository instance.
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, RoleRepositoryError> {
        Ok(Self { pool })
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self) -> Result<Vec<Role>, RoleRepositoryError> {
        let query = format!("SELECT {} FROM roles ORDER BY created_at, name", ROLE_COLUMNS);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(role_from_row).collect()
    }

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<Role>, RoleRepositoryError> {
        let query = format!("SELECT {} FROM roles WHERE id = $1", ROLE_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(role_from_row).transpose()
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, RoleRepositoryError> {
        let query = format!("SELECT {} FROM roles WHERE name = $1", ROLE_COLUMNS);
        let row = sqlx::query(&query).bind(name).fetch_optional(&self.pool).await?;
        row.as_ref().map(role_from_row).transpose()
    }

    async fn insert_role(&self, role: &Role) -> Result<(), RoleRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, permissions, is_system, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(permission_names(role))
        .bind(role.is_system)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_name_conflict(e, &role.name))?;
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> Result<u64, RoleRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous_name: String =
            sqlx::query_scalar("SELECT name FROM roles WHERE id = $1 FOR UPDATE")
                .bind(role.id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RoleRepositoryError::RoleNotFound(role.id))?;

        sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3, permissions = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(permission_names(role))
        .bind(role.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_name_conflict(e, &role.name))?;

        let renamed_users = if previous_name != role.name {
            sqlx::query("UPDATE users SET role = $2 WHERE role = $1")
                .bind(&previous_name)
                .bind(&role.name)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        } else {
            0
        };

        tx.commit().await?;
        Ok(renamed_users)
    }

    async fn delete_role(&self, id: RoleId, fallback_role: &str) -> Result<u64, RoleRepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT name, is_system FROM roles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RoleRepositoryError::RoleNotFound(id))?;
        let name: String = row.try_get("name")?;
        if row.try_get::<bool, _>("is_system")? {
            return Err(RoleRepositoryError::SystemRoleProtected(name));
        }
        if name == fallback_role {
            return Err(RoleRepositoryError::DefaultRoleProtected(name));
        }

        // Held until commit so the fallback cannot be renamed or deleted underneath us.
        sqlx::query("SELECT id FROM roles WHERE name = $1 FOR SHARE")
            .bind(fallback_role)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RoleRepositoryError::DefaultRoleMissing(fallback_role.to_string()))?;

        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let reassigned = sqlx::query("UPDATE users SET role = $2 WHERE role = $1")
            .bind(&name)
            .bind(fallback_role)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(reassigned)
    }
}
