use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub dataset_path: String,
    pub skip_if_populated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub server: ServerConfig,
    pub ingest: IngestConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://recipes.db".into());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);
        let server = ServerConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: match std::env::var("APP_PORT") {
                Ok(v) => v.parse()?,
                Err(_) => 3000,
            },
        };
        let ingest = IngestConfig {
            dataset_path: std::env::var("DATASET_PATH")
                .unwrap_or_else(|_| "data/US_recipes.json".into()),
            skip_if_populated: std::env::var("INGEST_SKIP_IF_POPULATED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        Ok(Self {
            database_url,
            max_connections,
            server,
            ingest,
        })
    }

    /// Config for tests: private in-memory database, ephemeral port.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            max_connections: 1,
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            ingest: IngestConfig {
                dataset_path: "US_recipes.json".into(),
                skip_if_populated: false,
            },
        }
    }
}
