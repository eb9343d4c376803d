//! Environment-driven settings for the Vote Ledger service.

use crate::errors::ServiceError;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use vote_ledger_core::moderation::DEFAULT_AUTO_HIDE_THRESHOLD;

/// Default address the HTTP server binds to.
const DEFAULT_SERVER_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default HTTP port.
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default size of the PostgreSQL connection pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console output.
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "console" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// PostgreSQL URL. Without it the service keeps votes in memory.
    pub database_url: Option<String>,
    pub server_host: IpAddr,
    pub server_port: u16,
    /// Downvotes at which an item is hidden; `0` disables auto-hide.
    pub auto_hide_threshold: u32,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            server_host: DEFAULT_SERVER_HOST,
            server_port: DEFAULT_SERVER_PORT,
            auto_hide_threshold: DEFAULT_AUTO_HIDE_THRESHOLD,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL URL (default: unset, in-memory storage)
    /// - `SERVER_HOST`: Bind address (default: 127.0.0.1)
    /// - `SERVER_PORT`: Bind port (default: 8080)
    /// - `AUTO_HIDE_DOWNVOTE_THRESHOLD`: Downvotes that hide an item, 0 disables (default: 3)
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
    /// - `RUN_MIGRATIONS`: Apply embedded migrations on startup (default: true)
    /// - `LOG_FORMAT`: "pretty" or "json" (default: pretty)
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Parsed settings
    /// * `Err(ServiceError::Config)` - A variable is set to an unparsable value
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: value("DATABASE_URL"),
            server_host: parse_or("SERVER_HOST", value("SERVER_HOST"), defaults.server_host)?,
            server_port: parse_or("SERVER_PORT", value("SERVER_PORT"), defaults.server_port)?,
            auto_hide_threshold: parse_or(
                "AUTO_HIDE_DOWNVOTE_THRESHOLD",
                value("AUTO_HIDE_DOWNVOTE_THRESHOLD"),
                defaults.auto_hide_threshold,
            )?,
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                value("DATABASE_MAX_CONNECTIONS"),
                defaults.max_connections,
            )?,
            run_migrations: parse_or("RUN_MIGRATIONS", value("RUN_MIGRATIONS"), defaults.run_migrations)?,
            log_format: parse_or("LOG_FORMAT", value("LOG_FORMAT"), defaults.log_format)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ServiceError::Config(format!("{name}={raw}: {e}"))),
        None => Ok(default),
    }
}
