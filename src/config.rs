use std::{env, str::FromStr, time::Duration};

use reqwest::Url;
use thiserror::Error;

use crate::listing::MAX_PER_PAGE;

/// Cookie session keys must carry at least 512 bits.
pub const MIN_SESSION_KEY_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("SESSION_KEY must be at least 64 bytes long")]
    ShortSessionKey,
}

/// Runtime settings read from the environment (and `.env` via dotenvy).
#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub database_url: String,
    pub session_key: String,
    pub backend_url: Url,
    pub backend_timeout: Duration,
    pub page_size: usize,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_key = lookup("SESSION_KEY").ok_or(ConfigError::Missing("SESSION_KEY"))?;
        if session_key.len() < MIN_SESSION_KEY_LEN {
            return Err(ConfigError::ShortSessionKey);
        }

        let raw_backend =
            lookup("BACKEND_URL").unwrap_or_else(|| "http://localhost:3001".to_owned());
        let backend_url = Url::parse(&raw_backend).map_err(|_| ConfigError::Invalid {
            name: "BACKEND_URL",
            value: raw_backend.clone(),
        })?;

        let page_size: usize = parse_var(&lookup, "PAGE_SIZE", 10)?;
        if page_size == 0 || page_size > MAX_PER_PAGE {
            return Err(ConfigError::Invalid {
                name: "PAGE_SIZE",
                value: page_size.to_string(),
            });
        }

        Ok(Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_var(&lookup, "PORT", 8080)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://repair_admin.db".to_owned()),
            session_key,
            backend_url,
            backend_timeout: Duration::from_secs(parse_var(&lookup, "BACKEND_TIMEOUT_SECS", 10)?),
            page_size,
            secure_cookies: parse_var(&lookup, "SECURE_COOKIES", false)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
