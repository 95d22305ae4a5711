use std::env;

use chrono::Duration;
use dotenv::dotenv;

use super::AppError;

/** Runtime settings, read once from the environment (and `.env` when present) */
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub port: u16,
    pub pool_size: u32,
    pub session_ttl: Duration,
}

impl Config {
    /// Loads the configuration from the process environment.
    /// Only `DATABASE_URL` is required, everything else has a default.
    ///
    /// # Example
    /// ```
    /// let config = Config::from_env()?;
    /// println!("listening on {}:{}", config.bind_address, config.port);
    /// ```
    pub fn from_env() -> Result<Config, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("Environment variable 'DATABASE_URL' not set".into()))?;

        Ok(Config {
            database_url,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            pool_size: parse_var("DB_POOL_SIZE", 10)?,
            session_ttl: Duration::days(parse_var("SESSION_TTL_DAYS", 30)?),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Environment variable '{}' is malformed", name))),
        Err(_) => Ok(default),
    }
}
