use std::sync::Arc;

use parley_store::MessageStore;
use parley_store_memory::MemoryMessageStore;

use crate::config::StoreConfig;
use crate::error::ServerError;

/// Create the message store backend named by the configuration.
///
/// `"memory"` is always available; `"postgres"` requires the `postgres`
/// feature and a connection URL.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn MessageStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryMessageStore::new())),

        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.url.clone().ok_or_else(|| {
                ServerError::Config("store.url is required for the postgres backend".into())
            })?;
            let mut pg = parley_store_postgres::PostgresConfig {
                url,
                ..parley_store_postgres::PostgresConfig::default()
            };
            if let Some(pool_size) = config.pool_size {
                pg.pool_size = pool_size;
            }
            if let Some(ref prefix) = config.prefix {
                pg.table_prefix.clone_from(prefix);
            }
            let store = parley_store_postgres::PostgresMessageStore::new(pg)
                .await
                .map_err(|e| ServerError::Config(format!("postgres store: {e}")))?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "postgres"))]
        "postgres" => Err(ServerError::Config(
            "postgres backend requires the `postgres` feature".into(),
        )),

        other => Err(ServerError::Config(format!(
            "unknown store backend: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_is_always_available() {
        let config = StoreConfig::default();
        assert!(create_store(&config).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let config = StoreConfig {
            backend: "sqlite".into(),
            ..StoreConfig::default()
        };
        let err = create_store(&config).await.map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("unknown store backend"));
    }
}
