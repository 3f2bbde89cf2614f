//! Connection pool and embedded schema migrations.
//!
//! Migrations live in `migrations/` at the crate root and are compiled into the
//! binary with `sqlx::migrate!`, so a fresh database only needs `run_migrations`.

use log::{info, warn};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Opens the Postgres pool described by `config`.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
}

/// Applies every migration that has not run yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
