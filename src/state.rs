use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Self::connect(config).await
    }

    /// Opens the pool and applies migrations.
    pub async fn connect(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("parse database url {}", config.database_url))?
            .create_if_missing(true);

        // An in-memory database lives as long as its connection, so the pool
        // never recycles idle ones.
        let db = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect(Arc::new(AppConfig::in_memory())).await
    }
}
