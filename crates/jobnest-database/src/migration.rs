//! Schema migrations for the identity tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use jobnest_core::error::{AppError, ErrorKind};

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies pending migrations and returns how many the schema knows of.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, AppError> {
    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Schema migration failed: {e}"),
            e,
        )
    })?;

    let known = MIGRATOR.iter().count();
    info!(migrations = known, "Schema is up to date");
    Ok(known)
}
