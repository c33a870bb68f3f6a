//! Database primitives: connection settings and pool setup.

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("invalid database setting {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
    #[error("database connection failed: {0}")]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven settings for the connection pool.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self::new(default_url_key())
    }
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Reads pool sizing from `DATABASE_MAX_CONNECTIONS` and
    /// `DATABASE_CONNECT_TIMEOUT_SECS`, keeping defaults for unset values.
    pub fn from_env() -> DbResult<Self> {
        let mut settings = Self::default();
        if let Some(value) = env_parse("DATABASE_MAX_CONNECTIONS")? {
            settings.max_connections = value;
        }
        if let Some(value) = env_parse("DATABASE_CONNECT_TIMEOUT_SECS")? {
            settings.connect_timeout_secs = value;
        }
        Ok(settings)
    }

    pub fn database_url(&self) -> DbResult<String> {
        std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl(self.env_key.clone()))
    }
}

fn env_parse<T: std::str::FromStr>(key: &'static str) -> DbResult<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DbError::InvalidSetting { key, value }),
        Err(_) => Ok(None),
    }
}

/// Opens a pool using the URL named by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    connect_url(&url, settings).await
}

pub async fn connect_url(url: &str, settings: &DatabaseSettings) -> DbResult<DbPool> {
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .sqlx_logging(false);
    let pool = Database::connect(options).await?;
    info!(
        backend = ?pool.get_database_backend(),
        max_connections = settings.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Runs a trivial query; `false` when the database cannot be reached.
pub async fn ping(pool: &DbPool) -> bool {
    let backend = pool.get_database_backend();
    pool.execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_names_the_variable() {
        let settings = DatabaseSettings::new("HR_TEST_DATABASE_URL_THAT_IS_NEVER_SET");
        let err = settings.database_url().unwrap_err();
        assert_eq!(
            err.to_string(),
            "database url missing (set HR_TEST_DATABASE_URL_THAT_IS_NEVER_SET)"
        );
    }

    #[test]
    fn defaults_are_applied() {
        let settings = DatabaseSettings::default();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.connect_timeout_secs, 5);
    }

    #[tokio::test]
    async fn ping_reports_reachable_sqlite() {
        let settings = DatabaseSettings {
            max_connections: 1,
            ..DatabaseSettings::default()
        };
        let pool = connect_url("sqlite::memory:", &settings).await.unwrap();
        assert!(ping(&pool).await);
    }
}
