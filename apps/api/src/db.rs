use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::{Config, StoreBackend};
use crate::lp::store::{LpStore, MemoryLpStore, PgLpStore};

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established ({max_connections} max connections)");
    Ok(pool)
}

/// Builds the configured `LpStore`, creating the Postgres schema when needed.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn LpStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let store = PgLpStore::new(create_pool(url, config.database_max_connections).await?);
            store
                .ensure_schema()
                .await
                .context("Failed to create lp_settings table")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory LP store; records are lost on restart");
            Ok(Arc::new(MemoryLpStore::new()))
        }
    }
}
