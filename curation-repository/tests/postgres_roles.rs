//! Integration tests for the PostgreSQL role repository.
//!
//! Run with: `cargo test --test postgres_roles`

use chrono::Utc;
use curation_repository::{PostgresRoleRepository, RoleRepository, RoleRepositoryError};
use curation_shared::types::{Permission, Role};
use uuid::Uuid;

fn make_role(name: &str, is_system: bool) -> Role {
    let now = Utc::now();
    Role {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{} role", name),
        permissions: vec![Permission::WebsiteView, Permission::CategoryManage],
        is_system,
        created_at: now,
        updated_at: now,
    }
}

async fn insert_user(pool: &sqlx::PgPool, role: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, role) VALUES ($1, $2)")
        .bind(id)
        .bind(role)
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn user_role(pool: &sqlx::PgPool, id: Uuid) -> String {
    sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_insert_and_find_role(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    let role = make_role("Editor", false);

    repository.insert_role(&role).await.unwrap();

    let by_name = repository.find_role_by_name("Editor").await.unwrap().unwrap();
    assert_eq!(by_name.id, role.id);
    assert_eq!(by_name.permissions, role.permissions);
    let by_id = repository.find_role_by_id(role.id).await.unwrap().unwrap();
    assert_eq!(by_id.name, "Editor");
    assert!(repository.find_role_by_name("Curator").await.unwrap().is_none());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_insert_duplicate_name(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    repository.insert_role(&make_role("Editor", false)).await.unwrap();

    let result = repository.insert_role(&make_role("Editor", false)).await;
    assert!(matches!(result, Err(RoleRepositoryError::DuplicateRoleName(name)) if name == "Editor"));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_rename_propagates_to_users(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    let mut role = make_role("Editor", false);
    repository.insert_role(&role).await.unwrap();
    let first = insert_user(&pool, "Editor").await;
    let second = insert_user(&pool, "Editor").await;
    let other = insert_user(&pool, "User").await;

    role.name = "Curator".to_string();
    role.permissions = vec![Permission::CategoryView];
    let renamed = repository.update_role(&role).await.unwrap();

    assert_eq!(renamed, 2);
    assert_eq!(user_role(&pool, first).await, "Curator");
    assert_eq!(user_role(&pool, second).await, "Curator");
    assert_eq!(user_role(&pool, other).await, "User");
    let stored = repository.find_role_by_id(role.id).await.unwrap().unwrap();
    assert_eq!(stored.permissions, vec![Permission::CategoryView]);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_update_missing_role(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    let role = make_role("Ghost", false);
    let result = repository.update_role(&role).await;
    assert!(matches!(result, Err(RoleRepositoryError::RoleNotFound(id)) if id == role.id));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_delete_reassigns_users(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    repository.insert_role(&make_role("User", true)).await.unwrap();
    let role = make_role("Editor", false);
    repository.insert_role(&role).await.unwrap();
    let user = insert_user(&pool, "Editor").await;

    let reassigned = repository.delete_role(role.id, "User").await.unwrap();

    assert_eq!(reassigned, 1);
    assert_eq!(user_role(&pool, user).await, "User");
    assert!(repository.find_role_by_id(role.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_delete_fallback_role_is_rejected(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    let role = make_role("Member", false);
    repository.insert_role(&role).await.unwrap();
    let user = insert_user(&pool, "Member").await;

    let result = repository.delete_role(role.id, "Member").await;

    assert!(matches!(result, Err(RoleRepositoryError::DefaultRoleProtected(name)) if name == "Member"));
    assert_eq!(user_role(&pool, user).await, "Member");
    assert!(repository.find_role_by_id(role.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_delete_with_undefined_fallback_is_rejected(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    let role = make_role("Editor", false);
    repository.insert_role(&role).await.unwrap();
    let user = insert_user(&pool, "Editor").await;

    let result = repository.delete_role(role.id, "Ghost").await;

    assert!(matches!(result, Err(RoleRepositoryError::DefaultRoleMissing(name)) if name == "Ghost"));
    assert_eq!(user_role(&pool, user).await, "Editor");
    assert!(repository.find_role_by_id(role.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_delete_system_role_is_rejected(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    let role = make_role("Moderator", true);
    repository.insert_role(&role).await.unwrap();

    let result = repository.delete_role(role.id, "User").await;

    assert!(matches!(result, Err(RoleRepositoryError::SystemRoleProtected(name)) if name == "Moderator"));
    assert!(repository.find_role_by_id(role.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_unknown_stored_permission_is_reported(pool: sqlx::PgPool) {
    let repository = PostgresRoleRepository::new(pool.clone()).await.unwrap();
    sqlx::query("INSERT INTO roles (id, name, permissions) VALUES ($1, 'Legacy', ARRAY['POST_PIN'])")
        .bind(Uuid::new_v4())
        .execute(&pool)
        .await
        .unwrap();

    let result = repository.find_role_by_name("Legacy").await;
    assert!(matches!(result, Err(RoleRepositoryError::InvalidPermission(p)) if p == "POST_PIN"));
}
