//! PostgreSQL-backed customer registry and module table

pub mod models;
pub mod repository;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

const ENV_POSTGRES_HOST: &str = "ADVISOR_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "ADVISOR_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "ADVISOR_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "ADVISOR_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "ADVISOR_POSTGRES_DB";
const ENV_POSTGRES_MAX_CONNECTIONS: &str = "ADVISOR_POSTGRES_MAX_CONNECTIONS";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),
}

/// Where the registry and module tables live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5432,
            user: "advisor".to_string(),
            password: "advisor".to_string(),
            database: "advisor".to_string(),
            max_connections: 10,
        }
    }
}

impl DbSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unparseable numbers keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let port = lookup(ENV_POSTGRES_PORT).and_then(|p| match p.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(e) => {
                tracing::warn!(value = %p, error = %e, "Invalid PostgreSQL port, using default");
                None
            }
        });
        let max_connections = lookup(ENV_POSTGRES_MAX_CONNECTIONS)
            .and_then(|n| n.trim().parse::<u32>().ok())
            .filter(|n| *n > 0);

        Self {
            host: text(ENV_POSTGRES_HOST, defaults.host),
            port: port.unwrap_or(defaults.port),
            user: text(ENV_POSTGRES_USER, defaults.user),
            password: lookup(ENV_POSTGRES_PASSWORD).unwrap_or(defaults.password),
            database: text(ENV_POSTGRES_DB, defaults.database),
            max_connections: max_connections.unwrap_or(defaults.max_connections),
        }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Connect using `ADVISOR_POSTGRES_*` settings
pub async fn create_pool() -> Result<PgPool, DbError> {
    let settings = DbSettings::from_env();

    tracing::debug!(
        host = %settings.host,
        port = settings.port,
        database = %settings.database,
        "Connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(settings.connect_options())
        .await?;

    tracing::info!(host = %settings.host, port = settings.port, "PostgreSQL connection established");

    Ok(pool)
}

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            industry TEXT,
            deployment_type VARCHAR(50),
            release_version VARCHAR(50),
            base_version VARCHAR(50),
            current_use_cases TEXT[] NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS modules (
            code VARCHAR(64) PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            min_version VARCHAR(50) NOT NULL,
            capabilities TEXT[] NOT NULL DEFAULT '{}',
            industry TEXT,
            release_version VARCHAR(50),
            base_version VARCHAR(50)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_customers_lower_name ON customers(LOWER(name))")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_modules_capabilities ON modules USING GIN(capabilities)")
        .execute(pool)
        .await?;

    tracing::info!("Database schema initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_settings_default_without_env() {
        assert_eq!(DbSettings::from_lookup(lookup(&[])), DbSettings::default());
    }

    #[test]
    fn test_settings_from_env_values() {
        let settings = DbSettings::from_lookup(lookup(&[
            ("ADVISOR_POSTGRES_HOST", "db.internal"),
            ("ADVISOR_POSTGRES_PORT", "6543"),
            ("ADVISOR_POSTGRES_DB", "sales"),
            ("ADVISOR_POSTGRES_MAX_CONNECTIONS", "4"),
        ]));

        assert_eq!(settings.host, "db.internal");
        assert_eq!(settings.port, 6543);
        assert_eq!(settings.database, "sales");
        assert_eq!(settings.max_connections, 4);
        assert_eq!(settings.user, "advisor");
    }

    #[test]
    fn test_invalid_numbers_keep_defaults() {
        let settings = DbSettings::from_lookup(lookup(&[
            ("ADVISOR_POSTGRES_PORT", "not-a-port"),
            ("ADVISOR_POSTGRES_MAX_CONNECTIONS", "0"),
            ("ADVISOR_POSTGRES_HOST", "  "),
        ]));

        assert_eq!(settings.port, 5432);
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.host, "127.0.0.1");
    }
}
