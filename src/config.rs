//! Process configuration.
//!
//! Settings are read once from the environment at start-up.  Every
//! variable has a default so the server runs with no configuration.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const SCHEDULE_DIR_VAR: &str = "AID_SCHEDULE_DIR";
pub const DEFAULT_EDITION_VAR: &str = "AID_DEFAULT_EDITION";
pub const BIND_ADDR_VAR: &str = "AID_BIND_ADDR";
pub const LOG_LEVEL_VAR: &str = "AID_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AID_BIND_ADDR must be a socket address such as 127.0.0.1:3000, got {value:?}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory scanned for additional rate schedule editions.
    pub schedule_dir: PathBuf,
    /// Edition used when a request does not name one.  `None` keeps
    /// the bundled edition.
    pub default_edition: Option<String>,
    pub bind_addr: SocketAddr,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let schedule_dir =
            env::var(SCHEDULE_DIR_VAR).unwrap_or_else(|_| "rate_schedules".to_string());
        let default_edition = env::var(DEFAULT_EDITION_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let bind = env::var(BIND_ADDR_VAR).unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                source,
            })?;
        let log_level = env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            schedule_dir: PathBuf::from(schedule_dir),
            default_edition,
            bind_addr,
            log_level,
        })
    }
}
