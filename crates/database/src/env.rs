use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tabletop_common::{env_flag, env_or, env_parse, EnvVars};

/// How the pool talks to PostgreSQL. A transaction pooler (pgbouncer in
/// transaction mode, Supabase port 6543) cannot hold prepared statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolerMode {
    Session,
    Transaction,
}

impl FromStr for PoolerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "session" => Ok(PoolerMode::Session),
            "transaction" => Ok(PoolerMode::Transaction),
            other => Err(anyhow!("unknown DB_POOLER mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseEnv {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
    pub pooler: PoolerMode,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub create_tables: bool,
}

impl EnvVars for DatabaseEnv {
    fn load() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url,
            host: env_or("DB_HOST", "localhost"),
            port: env_parse("DB_PORT", 5432)?,
            user: env_or("DB_USER", "postgres"),
            password: env_or("DB_PASSWORD", ""),
            database: env_or("DB_NAME", "postgres"),
            ssl_mode: env_or("DB_SSLMODE", "prefer"),
            pooler: env_or("DB_POOLER", "session").parse()?,
            max_connections: env_parse("DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: env_parse("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
            create_tables: env_flag("DB_CREATE_TABLES", true)?,
        })
    }

    fn get_env_var(&self, key: &str) -> Option<String> {
        match key {
            "DATABASE_URL" => self.database_url.clone(),
            "DB_HOST" => Some(self.host.clone()),
            "DB_PORT" => Some(self.port.to_string()),
            "DB_USER" => Some(self.user.clone()),
            "DB_NAME" => Some(self.database.clone()),
            "DB_SSLMODE" => Some(self.ssl_mode.clone()),
            "DB_MAX_CONNECTIONS" => Some(self.max_connections.to_string()),
            "DB_ACQUIRE_TIMEOUT_SECS" => Some(self.acquire_timeout_secs.to_string()),
            "DB_CREATE_TABLES" => Some(self.create_tables.to_string()),
            _ => None,
        }
    }
}

impl DatabaseEnv {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let options = match &self.database_url {
            Some(url) => PgConnectOptions::from_str(url)
                .map_err(|e| anyhow!("invalid DATABASE_URL: {}", e))?,
            None => PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.database)
                .ssl_mode(
                    PgSslMode::from_str(&self.ssl_mode)
                        .map_err(|e| anyhow!("invalid DB_SSLMODE: {}", e))?,
                ),
        };

        Ok(match self.pooler {
            PoolerMode::Session => options,
            PoolerMode::Transaction => options.statement_cache_capacity(0),
        })
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooler_mode_parses() {
        assert_eq!("Transaction".parse::<PoolerMode>().unwrap(), PoolerMode::Transaction);
        assert_eq!(" session ".parse::<PoolerMode>().unwrap(), PoolerMode::Session);
        assert!("statement".parse::<PoolerMode>().is_err());
    }

    #[test]
    fn discrete_settings_build_options() {
        let env = DatabaseEnv {
            database_url: None,
            host: "db.internal".into(),
            port: 6543,
            user: "tabletop".into(),
            password: "secret".into(),
            database: "campaigns".into(),
            ssl_mode: "require".into(),
            pooler: PoolerMode::Transaction,
            max_connections: 4,
            acquire_timeout_secs: 2,
            create_tables: false,
        };
        let options = env.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "tabletop");
        assert_eq!(options.get_database(), Some("campaigns"));
    }

    #[test]
    fn bad_url_is_reported() {
        let env = DatabaseEnv {
            database_url: Some("not a url".into()),
            host: String::new(),
            port: 5432,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            ssl_mode: "prefer".into(),
            pooler: PoolerMode::Session,
            max_connections: 10,
            acquire_timeout_secs: 5,
            create_tables: true,
        };
        assert!(env.connect_options().is_err());
    }
}
