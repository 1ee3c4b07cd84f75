use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Run database migrations, creating the drops table if it does not exist.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let drops_table = config.drops_table();

    let create_drops = format!(
        "CREATE TABLE IF NOT EXISTS {drops_table} (
            id TEXT PRIMARY KEY,
            delete_token TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL,
            text_content TEXT,
            blob_id TEXT,
            original_name TEXT,
            mime_type TEXT,
            size_bytes BIGINT,
            password_hash TEXT,
            one_time_view BOOLEAN NOT NULL DEFAULT FALSE,
            max_downloads INTEGER,
            view_count INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL
        )"
    );

    // The sweeper queries by expiry on every cycle.
    let create_expires_idx = format!(
        "CREATE INDEX IF NOT EXISTS {}drops_expires_at_idx ON {drops_table} (expires_at)",
        config.table_prefix
    );

    sqlx::query(&create_drops).execute(pool).await?;
    sqlx::query(&create_expires_idx).execute(pool).await?;

    Ok(())
}
