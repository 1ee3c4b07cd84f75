use std::sync::Arc;

use linkvault_store::DropStore;
use linkvault_store_memory::MemoryDropStore;
#[cfg(feature = "postgres")]
use linkvault_store_postgres::{PostgresConfig, PostgresDropStore};

use crate::config::StoreConfig;
use crate::error::ServerError;

/// Construct a [`DropStore`] from configuration.
///
/// Backends that keep a schema run their migrations here.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn DropStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryDropStore::new())),
        #[cfg(feature = "postgres")]
        "postgres" => create_postgres(config).await,
        other => Err(ServerError::Config(format!(
            "unsupported store backend: {other} (is the feature enabled?)"
        ))),
    }
}

#[cfg(feature = "postgres")]
async fn create_postgres(config: &StoreConfig) -> Result<Arc<dyn DropStore>, ServerError> {
    let store = PostgresDropStore::new(postgres_config(config)?)
        .await
        .map_err(|e| ServerError::Config(format!("postgres store: {e}")))?;
    Ok(Arc::new(store))
}

/// Map the `[store]` section onto a [`PostgresConfig`].
#[cfg(feature = "postgres")]
fn postgres_config(config: &StoreConfig) -> Result<PostgresConfig, ServerError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| ServerError::Config("postgres backend requires 'url' in [store]".into()))?;
    let defaults = PostgresConfig::default();
    Ok(PostgresConfig {
        url: url.to_owned(),
        pool_size: config.pool_size.unwrap_or(defaults.pool_size),
        schema: config.schema.clone().unwrap_or(defaults.schema),
        table_prefix: config.prefix.clone().unwrap_or(defaults.table_prefix),
        ssl_mode: config.ssl_mode.clone(),
        ssl_root_cert: config.ssl_root_cert.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_is_built() {
        let store = create_store(&StoreConfig::default()).await.unwrap();
        assert!(store.find_by_id("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_backend_is_a_config_error() {
        let config = StoreConfig {
            backend: "mongodb".into(),
            ..StoreConfig::default()
        };
        let err = create_store(&config).await.err().unwrap();
        assert!(matches!(err, ServerError::Config(_)));
        assert!(err.to_string().contains("mongodb"));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn postgres_settings_are_passed_through() {
        let config = StoreConfig {
            backend: "postgres".into(),
            url: Some("postgres://vault@db/linkvault".into()),
            prefix: Some("lv_".into()),
            pool_size: Some(12),
            schema: Some("shares".into()),
            ssl_mode: Some("verify-full".into()),
            ssl_root_cert: Some("/etc/ssl/db-ca.pem".into()),
        };
        let pg = postgres_config(&config).unwrap();
        assert_eq!(pg.url, "postgres://vault@db/linkvault");
        assert_eq!(pg.pool_size, 12);
        assert_eq!(pg.schema, "shares");
        assert_eq!(pg.table_prefix, "lv_");
        assert_eq!(pg.ssl_mode.as_deref(), Some("verify-full"));
        assert_eq!(pg.ssl_root_cert.as_deref(), Some("/etc/ssl/db-ca.pem"));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn postgres_requires_url() {
        let config = StoreConfig {
            backend: "postgres".into(),
            ..StoreConfig::default()
        };
        let pg = postgres_config(&config);
        assert!(matches!(pg, Err(ServerError::Config(_))));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn postgres_defaults_fill_gaps() {
        let config = StoreConfig {
            backend: "postgres".into(),
            url: Some("postgres://localhost/linkvault".into()),
            ..StoreConfig::default()
        };
        let pg = postgres_config(&config).unwrap();
        assert_eq!(pg.schema, "public");
        assert_eq!(pg.table_prefix, "linkvault_");
        assert!(pg.ssl_mode.is_none());
        assert!(pg.ssl_root_cert.is_none());
    }
}
