//! Application configuration from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUSH_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";

/// Everything the process reads from its environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub scheduler_interval: Duration,
    pub lock_ttl_minutes: i64,
    pub scheduler_batch_limit: i64,
    /// `None` disables real push delivery (log-only transport).
    pub push_endpoint: Option<Url>,
    pub expo_access_token: Option<String>,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Read the configuration, failing with a readable message on a missing
    /// `DATABASE_URL` or an unparseable value.
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL is not set".to_owned())?;
        let bind_addr: SocketAddr = parse_var(
            "BIND_ADDR",
            DEFAULT_BIND_ADDR.parse().map_err(|e| format!("{e}"))?,
        )?;
        let interval_secs: u64 = parse_var("SCHEDULER_INTERVAL_SECS", 60)?;
        let lock_ttl_minutes: i64 = parse_var("LOCK_TTL_MINUTES", 10)?;
        let scheduler_batch_limit: i64 = parse_var("SCHEDULER_BATCH_LIMIT", 20)?;

        // Setting PUSH_ENDPOINT to the empty string turns push off; unset
        // means the public Expo endpoint.
        let push_endpoint = match std::env::var("PUSH_ENDPOINT") {
            Ok(raw) if raw.is_empty() => None,
            Ok(raw) => Some(
                Url::parse(&raw).map_err(|e| format!("PUSH_ENDPOINT is not a valid URL: {e}"))?,
            ),
            Err(_) => Some(
                Url::parse(DEFAULT_PUSH_ENDPOINT).map_err(|e| format!("{e}"))?,
            ),
        };
        let expo_access_token = std::env::var("EXPO_ACCESS_TOKEN").ok().filter(|t| !t.is_empty());

        Ok(Self {
            database_url,
            bind_addr,
            scheduler_interval: Duration::from_secs(interval_secs),
            lock_ttl_minutes,
            scheduler_batch_limit,
            push_endpoint,
            expo_access_token,
        })
    }
}
