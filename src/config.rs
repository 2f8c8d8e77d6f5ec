use std::{env, fmt::Display, str::FromStr};

use anyhow::{Context, anyhow};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub seed_demo_data: bool,
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            info!("no .env loaded: {e}");
        }

        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite://uniforum.db?mode=rwc")?,
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:8080")?,
            max_connections: try_load("DB_MAX_CONNECTIONS", "16")?,
            seed_demo_data: try_load("SEED_DEMO_DATA", "false")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value {raw:?}"))
}
