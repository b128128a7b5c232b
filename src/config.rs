use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    MongoDb,
    Memory,
}

impl FromStr for DbType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(DbType::MongoDb),
            "memory" => Ok(DbType::Memory),
            other => Err(anyhow!("Unsupported database type: {}", other)),
        }
    }
}

/// Startup configuration, read once and injected through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub db_type: DbType,
    pub database_url: Option<String>,
    pub database_name: String,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_sweep_interval: Duration,
    pub frontend_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub admin_username: String,
    pub admin_password_hash: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            base_url: "http://localhost:5000".to_string(),
            db_type: DbType::Memory,
            database_url: None,
            database_name: "qr_tracker".to_string(),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(30),
            cache_sweep_interval: Duration::from_secs(60),
            frontend_url: None,
            jwt_secret: None,
            admin_username: "admin".to_string(),
            admin_password_hash: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {}", p))?,
            None => 5000,
        };

        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let db_type = match var("DB_TYPE") {
            Some(t) => t.parse()?,
            None => DbType::MongoDb,
        };
        let database_url = var("MONGODB_URI").or_else(|| var("DATABASE_URL"));
        if db_type == DbType::MongoDb && database_url.is_none() {
            bail!("MONGODB_URI or DATABASE_URL must be set when DB_TYPE is mongodb");
        }

        let secs = |name: &str, default: u64| -> Result<Duration> {
            match var(name) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{} must be a number of seconds", name)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let cache_enabled = match var("CACHE_ENABLED") {
            Some(v) => v
                .trim()
                .parse::<bool>()
                .with_context(|| format!("CACHE_ENABLED must be true or false, got {}", v))?,
            None => true,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            base_url,
            db_type,
            database_url,
            database_name: var("DATABASE_NAME").unwrap_or_else(|| "qr_tracker".to_string()),
            cache_enabled,
            cache_ttl: secs("CACHE_TTL_SECS", 30)?,
            cache_sweep_interval: secs("CACHE_SWEEP_SECS", 60)?,
            frontend_url: var("FRONTEND_URL"),
            jwt_secret: var("JWT_SECRET"),
            admin_username: var("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password_hash: var("ADMIN_PASSWORD_HASH"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_for_memory_backend() {
        let cfg = config(&[("DB_TYPE", "memory")]).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.base_url, "http://localhost:5000");
        assert_eq!(cfg.db_type, DbType::Memory);
        assert!(cfg.cache_enabled);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(30));
        assert_eq!(cfg.admin_username, "admin");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let cfg = config(&[
            ("DB_TYPE", "memory"),
            ("BASE_URL", "https://qr.example.com/"),
        ])
        .unwrap();
        assert_eq!(cfg.base_url, "https://qr.example.com");
    }

    #[test]
    fn mongodb_requires_a_connection_string() {
        assert!(config(&[]).is_err());
        let cfg = config(&[("DATABASE_URL", "mongodb://localhost:27017")]).unwrap();
        assert_eq!(cfg.db_type, DbType::MongoDb);
        assert_eq!(cfg.database_url.as_deref(), Some("mongodb://localhost:27017"));
    }

    #[test]
    fn invalid_values_are_startup_errors() {
        assert!(config(&[("DB_TYPE", "postgres")]).is_err());
        assert!(config(&[("DB_TYPE", "memory"), ("PORT", "http")]).is_err());
        assert!(config(&[("DB_TYPE", "memory"), ("CACHE_ENABLED", "maybe")]).is_err());
    }
}
