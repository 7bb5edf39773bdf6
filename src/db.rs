//! Database module
//!
//! Database connection and schema utilities.

use sqlx::PgPool;

/// Schema shipped in `migrations/`. Applying it is left to the deployment;
/// tests and the load-test binary apply it directly.
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Advisory lock key serialising concurrent schema setup.
const SCHEMA_LOCK_KEY: i64 = 0x5b_a4_c0_de;

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = ["accounts", "transfers", "entries"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Create the ledger tables if they are missing.
///
/// Safe to call from several processes at once: the statements run in one
/// transaction holding an advisory lock.
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    // Multi-statement string: sent through the simple query protocol.
    sqlx::Executor::execute(&mut *tx, SCHEMA_SQL).await?;

    tx.commit().await?;

    tracing::info!("Ledger schema applied");
    Ok(())
}
