use std::sync::Arc;

use curation_core::{AuthorizationGate, RoleService, VoteLedger, VoteLedgerConfig};
use curation_repository::{MIGRATOR, PostgresRoleRepository, PostgresVoteRepository, VoteRepository};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::config::Settings;
use crate::errors::AppError;

/// `Dependencies` holds the wired core services.
///
/// The vote ledger, role service and authorization gate all share one
/// PostgreSQL pool.
pub struct Dependencies {
    pub pool: PgPool,
    pub votes: Arc<PostgresVoteRepository>,
    pub ledger: VoteLedger,
    pub roles: RoleService,
    pub gate: AuthorizationGate,
}

impl Dependencies {
    /// Connects to PostgreSQL and builds the core services.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or an
    /// `AppError` if the database cannot be reached.
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        info!(
            max_connections = settings.max_connections,
            vote_conflict_retries = settings.vote_conflict_retries,
            default_role = %settings.default_role,
            "Initializing dependencies"
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.database_url)
            .await?;

        let votes = Arc::new(PostgresVoteRepository::new(pool.clone()).await?);
        let roles = Arc::new(PostgresRoleRepository::new(pool.clone()).await?);

        let ledger = VoteLedger::with_config(
            votes.clone(),
            VoteLedgerConfig {
                conflict_retries: settings.vote_conflict_retries,
                ..VoteLedgerConfig::default()
            },
        );

        Ok(Self {
            pool,
            votes,
            ledger,
            roles: RoleService::with_default_role(roles.clone(), settings.default_role.clone()),
            gate: AuthorizationGate::new(roles),
        })
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Fails with a configuration error if the schema has not been migrated.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        if self.votes.check_tables_created().await? {
            Ok(())
        } else {
            warn!("Vote tables are missing");
            Err(AppError::config(
                "database schema is missing, run `curation migrate` first",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;

    fn settings(database_url: &str) -> Settings {
        Settings {
            database_url: database_url.to_string(),
            max_connections: 1,
            vote_conflict_retries: 3,
            default_role: "User".to_string(),
            log_format: LogFormat::Pretty,
        }
    }

    #[tokio::test]
    async fn test_dependencies_new_invalid_database_url() {
        let result = Dependencies::new(&settings("invalid-database-url")).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
