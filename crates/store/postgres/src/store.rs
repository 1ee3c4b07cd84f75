use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use linkvault_core::{Drop, DropContent, FileRef};
use linkvault_store::{DropStore, StoreError, ViewOutcome};

use crate::config::PostgresConfig;
use crate::migrations;

const DROP_COLUMNS: &str = "id, delete_token, kind, text_content, blob_id, original_name, \
     mime_type, size_bytes, password_hash, one_time_view, max_downloads, view_count, \
     created_at, expires_at";

/// Build `PgConnectOptions` from a [`PostgresConfig`], applying SSL settings
/// when configured.
pub(crate) fn build_connect_options(
    config: &PostgresConfig,
) -> Result<sqlx::postgres::PgConnectOptions, StoreError> {
    let mut options: sqlx::postgres::PgConnectOptions = config
        .url
        .parse()
        .map_err(|e: sqlx::Error| StoreError::Connection(e.to_string()))?;

    if let Some(ref mode) = config.ssl_mode {
        let ssl_mode = match mode.as_str() {
            "disable" => sqlx::postgres::PgSslMode::Disable,
            "prefer" => sqlx::postgres::PgSslMode::Prefer,
            "require" => sqlx::postgres::PgSslMode::Require,
            "verify-ca" => sqlx::postgres::PgSslMode::VerifyCa,
            "verify-full" => sqlx::postgres::PgSslMode::VerifyFull,
            other => {
                return Err(StoreError::Connection(format!("unknown ssl_mode: {other}")));
            }
        };
        options = options.ssl_mode(ssl_mode);
    }

    if let Some(ref path) = config.ssl_root_cert {
        options = options.ssl_root_cert(path);
    }

    Ok(options)
}

/// A row of the drops table.
#[derive(Debug, sqlx::FromRow)]
struct DropRow {
    id: String,
    delete_token: String,
    kind: String,
    text_content: Option<String>,
    blob_id: Option<String>,
    original_name: Option<String>,
    mime_type: Option<String>,
    size_bytes: Option<i64>,
    password_hash: Option<String>,
    one_time_view: bool,
    max_downloads: Option<i32>,
    view_count: i32,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<DropRow> for Drop {
    type Error = StoreError;

    fn try_from(row: DropRow) -> Result<Self, Self::Error> {
        let content = match row.kind.as_str() {
            "text" => DropContent::Text {
                text: row.text_content.unwrap_or_default(),
            },
            "file" => DropContent::File(FileRef {
                blob_id: row.blob_id.ok_or_else(|| {
                    StoreError::Serialization(format!("file drop {} has no blob_id", row.id))
                })?,
                original_name: row.original_name.unwrap_or_default(),
                mime_type: row.mime_type.unwrap_or_default(),
                size_bytes: row
                    .size_bytes
                    .and_then(|n| u64::try_from(n).ok())
                    .unwrap_or_default(),
            }),
            other => {
                return Err(StoreError::Serialization(format!(
                    "unknown drop kind: {other}"
                )));
            }
        };

        Ok(Drop {
            id: row.id,
            delete_token: row.delete_token,
            content,
            password_hash: row.password_hash,
            one_time_view: row.one_time_view,
            max_downloads: row.max_downloads.map(to_u32).transpose()?,
            view_count: to_u32(row.view_count)?,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

fn to_u32(value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|e| StoreError::Serialization(format!("negative counter: {e}")))
}

fn to_i32(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|e| StoreError::Serialization(format!("counter overflow: {e}")))
}

fn backend(e: &sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// PostgreSQL-backed implementation of [`DropStore`].
///
/// Uses `sqlx::PgPool` for connection pooling. View recording is a single
/// conditional `UPDATE`, so the download limit and one-time view hold under
/// concurrent retrieval.
pub struct PostgresDropStore {
    pool: PgPool,
    config: Arc<PostgresConfig>,
}

impl PostgresDropStore {
    /// Create a new `PostgresDropStore` from the provided configuration.
    ///
    /// Connects to `PostgreSQL`, creates the connection pool, and runs
    /// migrations to ensure the drops table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if pool creation fails, or
    /// [`StoreError::Backend`] if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StoreError> {
        let connect_options = build_connect_options(&config)?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Create a `PostgresDropStore` from an existing pool and config.
    ///
    /// Runs migrations on creation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if migrations fail.
    pub async fn from_pool(pool: PgPool, config: PostgresConfig) -> Result<Self, StoreError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| backend(&e))?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    /// Work out why a conditional view update matched no row.
    async fn classify_rejected_view(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<ViewOutcome, StoreError> {
        let table = self.config.drops_table();
        let query = format!("SELECT {DROP_COLUMNS} FROM {table} WHERE id = $1");
        let row: Option<DropRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

        let Some(row) = row else {
            return Ok(ViewOutcome::Missing);
        };
        let drop = Drop::try_from(row)?;
        if drop.is_exhausted() && !drop.is_expired(now) {
            Ok(ViewOutcome::Exhausted)
        } else {
            Ok(ViewOutcome::Expired)
        }
    }
}

#[async_trait]
impl DropStore for PostgresDropStore {
    async fn insert(&self, drop: &Drop) -> Result<(), StoreError> {
        let table = self.config.drops_table();
        let query = format!(
            "INSERT INTO {table} ({DROP_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        );

        let (text, file) = match &drop.content {
            DropContent::Text { text } => (Some(text.as_str()), None),
            DropContent::File(file) => (None, Some(file)),
        };
        let size_bytes = file
            .map(|f| i64::try_from(f.size_bytes))
            .transpose()
            .map_err(|e| StoreError::Serialization(format!("size overflow: {e}")))?;

        let result = sqlx::query(&query)
            .bind(&drop.id)
            .bind(&drop.delete_token)
            .bind(drop.kind().as_str())
            .bind(text)
            .bind(file.map(|f| f.blob_id.as_str()))
            .bind(file.map(|f| f.original_name.as_str()))
            .bind(file.map(|f| f.mime_type.as_str()))
            .bind(size_bytes)
            .bind(drop.password_hash.as_deref())
            .bind(drop.one_time_view)
            .bind(drop.max_downloads.map(to_i32).transpose()?)
            .bind(to_i32(drop.view_count)?)
            .bind(drop.created_at)
            .bind(drop.expires_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                StoreError::UniqueViolation(db.constraint().unwrap_or("drops").to_owned()),
            ),
            Err(e) => Err(backend(&e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Drop>, StoreError> {
        let table = self.config.drops_table();
        let query = format!("SELECT {DROP_COLUMNS} FROM {table} WHERE id = $1");

        let row: Option<DropRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

        row.map(Drop::try_from).transpose()
    }

    async fn save(&self, drop: &Drop) -> Result<(), StoreError> {
        let table = self.config.drops_table();
        let query =
            format!("UPDATE {table} SET view_count = $2, expires_at = $3 WHERE id = $1");

        let result = sqlx::query(&query)
            .bind(&drop.id)
            .bind(to_i32(drop.view_count)?)
            .bind(drop.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(drop.id.clone()));
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let table = self.config.drops_table();
        let query = format!("DELETE FROM {table} WHERE id = $1");

        let result = sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_all_expired(&self, now: DateTime<Utc>) -> Result<Vec<Drop>, StoreError> {
        let table = self.config.drops_table();
        let query = format!(
            "SELECT {DROP_COLUMNS} FROM {table} WHERE expires_at <= $1 ORDER BY expires_at"
        );

        let rows: Vec<DropRow> = sqlx::query_as(&query)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

        debug!(count = rows.len(), "loaded expired drops");
        rows.into_iter().map(Drop::try_from).collect()
    }

    async fn record_view(&self, id: &str, now: DateTime<Utc>) -> Result<ViewOutcome, StoreError> {
        let table = self.config.drops_table();
        let query = format!(
            "UPDATE {table} \
             SET view_count = view_count + 1, \
                 expires_at = CASE WHEN one_time_view THEN $2 ELSE expires_at END \
             WHERE id = $1 \
               AND expires_at > $2 \
               AND (max_downloads IS NULL OR view_count < max_downloads) \
             RETURNING view_count"
        );

        let row: Option<(i32,)> = sqlx::query_as(&query)
            .bind(id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

        match row {
            Some((view_count,)) => Ok(ViewOutcome::Recorded {
                view_count: to_u32(view_count)?,
            }),
            None => self.classify_rejected_view(id, now).await,
        }
    }
}
