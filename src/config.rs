use std::env;
use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite:data/journal.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. `from_env` is this
    /// with the process environment plugged in.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let token_ttl_minutes = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => parse_positive("ACCESS_TOKEN_EXPIRE_MINUTES", &raw)?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    reason: format!("'{raw}' is not a number"),
                })?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::Invalid {
                        name: "BCRYPT_COST",
                        reason: "must be between 4 and 31".to_string(),
                    });
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            token_ttl_minutes,
            bcrypt_cost,
        })
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<i64, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("'{raw}' is not a positive integer"),
        }),
    }
}
