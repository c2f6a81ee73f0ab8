use std::env;

use crate::domain::receipt::{DEFAULT_RECEIPT_PREFIX, is_valid_prefix};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub jwt_ttl_hours: i64,
    pub receipt_prefix: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let receipt_prefix = receipt_prefix(env::var("RECEIPT_PREFIX").ok());
        Ok(Self {
            port,
            database_url,
            host,
            max_connections,
            jwt_ttl_hours,
            receipt_prefix,
        })
    }
}

fn receipt_prefix(raw: Option<String>) -> String {
    match raw {
        Some(prefix) if is_valid_prefix(&prefix) => prefix,
        Some(prefix) => {
            tracing::warn!(
                %prefix,
                fallback = DEFAULT_RECEIPT_PREFIX,
                "invalid RECEIPT_PREFIX, using default"
            );
            DEFAULT_RECEIPT_PREFIX.to_string()
        }
        None => DEFAULT_RECEIPT_PREFIX.to_string(),
    }
}
