//! Process settings read from the environment, with `.env` loaded through `dotenvy`.

use crate::config::Generation;
use crate::error::ConfigError;
use crate::service::DeletePolicy;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_SCHEMA: &str = "public";
const DEFAULT_FUZZY_THRESHOLD: u8 = 75;
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
const DEFAULT_SENDER: &str = "no-reply@localhost";

#[derive(Clone, Debug)]
pub struct Settings {
    /// When absent the service runs against the in-memory store.
    pub database_url: Option<String>,
    /// PostgreSQL schema holding the account tables.
    pub db_schema: String,
    pub bind_addr: String,
    pub generation: Generation,
    /// Custom generation file; takes precedence over `generation`.
    pub schema_path: Option<PathBuf>,
    /// `None` lets the service pick based on the schema generation.
    pub delete_policy: Option<DeletePolicy>,
    pub fuzzy_threshold: u8,
    pub notify_url: Option<String>,
    pub notify_api_key: Option<String>,
    pub notify_sender: String,
    pub max_body_bytes: usize,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let generation: Generation = match get("SCHEMA_GENERATION") {
            Some(v) => v.parse()?,
            None => Generation::Auth,
        };
        let delete_policy: Option<DeletePolicy> = get("DELETE_POLICY").map(|v| v.parse::<DeletePolicy>()).transpose()?;
        let fuzzy_threshold = match get("FUZZY_THRESHOLD") {
            Some(v) => parse_threshold(&v)?,
            None => DEFAULT_FUZZY_THRESHOLD,
        };
        let max_body_bytes: usize = match get("MAX_BODY_BYTES") {
            Some(v) => v.parse().map_err(|_| ConfigError::Settings {
                name: "MAX_BODY_BYTES",
                message: format!("'{}' is not a byte count", v),
            })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Settings {
            database_url: get("DATABASE_URL"),
            db_schema: get("ACCOUNTS_SCHEMA").unwrap_or_else(|| DEFAULT_DB_SCHEMA.into()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            generation,
            schema_path: get("SCHEMA_PATH").map(PathBuf::from),
            delete_policy,
            fuzzy_threshold,
            notify_url: get("NOTIFY_URL"),
            notify_api_key: get("NOTIFY_API_KEY"),
            notify_sender: get("NOTIFY_SENDER").unwrap_or_else(|| DEFAULT_SENDER.into()),
            max_body_bytes,
        })
    }
}

fn parse_threshold(raw: &str) -> Result<u8, ConfigError> {
    match raw.parse::<u8>() {
        Ok(n) if n <= 100 => Ok(n),
        _ => Err(ConfigError::Settings {
            name: "FUZZY_THRESHOLD",
            message: format!("'{}' is not a score between 0 and 100", raw),
        }),
    }
}
