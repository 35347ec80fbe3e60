//! Environment-driven setup of the ledger store.
//!
//! Variables are read after loading a `.env` file, if present:
//!
//! * `DATABASE_URL` - PostgreSQL connection string (required)
//! * `DATABASE_MAX_CONNECTIONS` - pool size (optional, defaults to 5)
//! * `VOTE_LEDGER_ENFORCE_UNIQUENESS` - `true` or `false` (optional, defaults to `true`)
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use vote_ledger_repository::{LedgerConfig, PostgresVoteRepository, VoteRepository};

use crate::errors::ConfigError;

const DATABASE_URL: &str = "DATABASE_URL";
const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
const ENFORCE_UNIQUENESS: &str = "VOTE_LEDGER_ENFORCE_UNIQUENESS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings of the PostgreSQL ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the settings through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(DATABASE_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingVariable(DATABASE_URL))?;

        let max_connections = match lookup(DATABASE_MAX_CONNECTIONS) {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidVariable {
                    name: DATABASE_MAX_CONNECTIONS,
                    value,
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            url,
            max_connections,
        })
    }
}

/// Loads the ledger rules from the environment.
pub fn ledger_config_from_env() -> Result<LedgerConfig, ConfigError> {
    dotenv().ok();
    ledger_config_from_lookup(|name| std::env::var(name).ok())
}

pub fn ledger_config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LedgerConfig, ConfigError> {
    let Some(value) = lookup(ENFORCE_UNIQUENESS) else {
        return Ok(LedgerConfig::default());
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(LedgerConfig::default()),
        "false" | "0" | "no" => Ok(LedgerConfig::allow_multiple_votes()),
        _ => Err(ConfigError::InvalidVariable {
            name: ENFORCE_UNIQUENESS,
            value,
        }),
    }
}

/// Connects to PostgreSQL, applies the bundled migration and returns a
/// ready repository.
pub async fn connect_postgres_ledger(
    settings: &DatabaseSettings,
    config: LedgerConfig,
) -> Result<Arc<dyn VoteRepository>, ConfigError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await?;

    let repository = PostgresVoteRepository::with_config(pool, config.clone());
    repository.migrate().await?;

    info!(
        max_connections = settings.max_connections,
        enforce_uniqueness = config.enforce_uniqueness,
        "Vote ledger ready"
    );
    Ok(Arc::new(repository))
}

/// Reads every setting from the environment and connects.
pub async fn connect_from_env() -> Result<Arc<dyn VoteRepository>, ConfigError> {
    let settings = DatabaseSettings::from_env()?;
    let config = ledger_config_from_env()?;
    connect_postgres_ledger(&settings, config).await
}
