/// Database layer
///
/// Connection pooling and embedded migrations. The dashboard only ever reads
/// the bot's tables (and runs the schema migrations that create them); all
/// writes happen in the bot's webhook pipeline, outside this codebase.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with a startup health check
/// - `migrations`: sqlx migration runner for the `migrations/` directory

pub mod migrations;
pub mod pool;
