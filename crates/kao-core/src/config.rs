use std::{env, path::PathBuf, time::Duration};

use crate::{domain::Address, errors::Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.zulip.com/v1";
pub const DEFAULT_COMMAND: &str = "@kao";

/// Username + API key pair for the chat platform.
#[derive(Clone)]
pub struct AccountCredentials {
    pub address: Address,
    pub api_key: String,
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("address", &self.address)
            .field("api_key", &"***")
            .finish()
    }
}

/// Where the credential table lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    InMemory,
}

/// Typed configuration, read from the environment (and an optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Chat platform
    pub bot: AccountCredentials,
    /// Account used to list every stream when no explicit list is given.
    pub discovery: AccountCredentials,
    pub api_base: String,
    pub http_timeout: Duration,

    // Bot behavior
    pub command: String,
    /// Empty means "every stream the discovery account can see".
    pub subscribed_streams: Vec<String>,

    // Storage
    pub database: DatabaseLocation,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Existing environment variables win over `.env`.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Build from any key → value source (the environment in production).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key).and_then(non_empty).ok_or_else(|| {
                Error::Config(format!("{key} environment variable is required"))
            })
        };

        let bot = AccountCredentials {
            address: Address(required("ZULIP_USR")?),
            api_key: required("ZULIP_API")?,
        };

        // The discovery account falls back to the bot account.
        let discovery = match (
            get("ZULIP_PRIVATE_USR").and_then(non_empty),
            get("ZULIP_PRIVATE_API").and_then(non_empty),
        ) {
            (Some(address), Some(api_key)) => AccountCredentials {
                address: Address(address),
                api_key,
            },
            (None, None) => bot.clone(),
            _ => {
                return Err(Error::Config(
                    "ZULIP_PRIVATE_USR and ZULIP_PRIVATE_API must be set together".to_string(),
                ))
            }
        };

        let database = parse_database_url(&required("DATABASE_URL")?)?;

        let api_base = get("ZULIP_API_BASE")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let command = get("KAO_COMMAND")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_COMMAND.to_string());
        if command.contains(char::is_whitespace) {
            return Err(Error::Config(format!(
                "KAO_COMMAND must be a single token, got {command:?}"
            )));
        }

        let subscribed_streams = parse_csv(get("KAO_STREAMS"));

        // Long-polling holds requests open for about a minute; keep the timeout above that.
        let http_timeout = Duration::from_secs(
            get("KAO_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(90),
        );

        Ok(Self {
            bot,
            discovery,
            api_base,
            http_timeout,
            command,
            subscribed_streams,
            database,
        })
    }
}

fn parse_database_url(raw: &str) -> Result<DatabaseLocation> {
    let raw = raw.trim();
    let path = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw);

    if path == ":memory:" {
        return Ok(DatabaseLocation::InMemory);
    }
    if path.is_empty() || path.contains("://") {
        return Err(Error::Config(format!(
            "DATABASE_URL must be a SQLite path (optionally prefixed with sqlite://), got {raw:?}"
        )));
    }
    Ok(DatabaseLocation::File(PathBuf::from(path)))
}

fn parse_csv(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
