//! Curation maintenance CLI.
//!
//! Applies migrations, seeds the system roles, lists roles and reconciles
//! vote counters with the vote ledger.

use clap::{Parser, Subcommand};
use curation::{AppError, Dependencies, LogFormat, Settings};
use curation_shared::types::TargetKind;
use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "curation")]
#[command(about = "Maintenance tasks for the curation vote ledger and roles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Insert the Admin, Moderator and User roles if they are missing
    SeedRoles,
    /// Compare vote counters with the vote ledger
    Reconcile {
        /// Target kind to check (website or comment)
        #[arg(long)]
        kind: TargetKind,
        /// Overwrite drifted counters with the ledger-derived values
        #[arg(long)]
        apply: bool,
    },
    /// List roles with their permissions
    Roles,
}

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("curation=info,curation_core=info,curation_repository=info")
    });

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .init();
        }
    }

    info!(
        service_name = "curation",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
}

async fn run(command: Command, deps: &Dependencies) -> Result<(), AppError> {
    if !matches!(command, Command::Migrate) {
        deps.ensure_schema().await?;
    }

    match command {
        Command::Migrate => deps.migrate().await,
        Command::SeedRoles => {
            let seeded = deps.roles.seed_system_roles().await?;
            info!(seeded = seeded.len(), "System roles seeded");
            Ok(())
        }
        Command::Reconcile { kind, apply } => {
            let drifts = if apply {
                deps.ledger.repair_counters(kind).await?
            } else {
                deps.ledger.audit_counters(kind).await?
            };
            for drift in &drifts {
                warn!(
                    target_id = %drift.stored.target_id,
                    stored_upvotes = drift.stored.upvotes,
                    stored_downvotes = drift.stored.downvotes,
                    expected_upvotes = drift.expected.upvotes,
                    expected_downvotes = drift.expected.downvotes,
                    repaired = apply,
                    "Counter drift"
                );
            }
            info!(kind = %kind, drifted = drifts.len(), repaired = apply, "Reconciliation finished");
            Ok(())
        }
        Command::Roles => {
            for role in deps.roles.list_roles().await? {
                let permissions: Vec<&str> = role.permissions.iter().map(|p| p.as_str()).collect();
                info!(
                    role_id = %role.id,
                    name = %role.name,
                    is_system = role.is_system,
                    permissions = %permissions.join(","),
                    "Role"
                );
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    let cli = Cli::parse();

    init_tracing(Settings::log_format_from_env()?);

    let settings = Settings::from_env()?;
    let deps = match Dependencies::new(&settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    if let Err(e) = run(cli.command, &deps).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}
