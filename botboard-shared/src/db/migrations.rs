/// Database migration runner
///
/// Migrations live in `botboard-shared/migrations/` and are embedded into
/// the binary with `sqlx::migrate!`, so the server can bring a fresh
/// database up to the full schema on first start.
///
/// # Example
///
/// ```no_run
/// use botboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use botboard_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Runs all pending migrations
///
/// # Errors
///
/// Returns an error if a migration file fails to apply or the connection is
/// lost mid-run; already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("Database migrations up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Creates the database if it does not exist yet
///
/// Convenience for development and tests; production databases are
/// provisioned out of band.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
