//! Configuration module for the academy backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default session window: 24 hours.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Longest accepted session window: one year.
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Output format for the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Fixed admin username
    pub admin_username: String,
    /// Password written for the admin on first start only
    pub admin_initial_password: String,
    /// How long an admin session stays valid after login
    pub session_ttl_secs: u64,
    /// Insert the built-in course catalogue into an empty courses table
    pub seed_catalogue: bool,
}

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("ACADEMY_DB_PATH")
            .unwrap_or_else(|_| "./data/academy.sqlite".to_string())
            .into();

        let bind_addr = env::var("ACADEMY_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError {
                var: "ACADEMY_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let log_level = env::var("ACADEMY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("ACADEMY_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(other) => {
                return Err(ConfigError {
                    var: "ACADEMY_LOG_FORMAT",
                    reason: format!("expected 'pretty' or 'json', got '{}'", other),
                })
            }
        };

        let admin_username =
            env::var("ACADEMY_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_initial_password =
            env::var("ACADEMY_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        let session_ttl_secs = match env::var("ACADEMY_SESSION_TTL_SECS") {
            Ok(raw) => parse_session_ttl(&raw)?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        let seed_catalogue = env::var("ACADEMY_SEED_CATALOGUE")
            .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_format,
            admin_username,
            admin_initial_password,
            session_ttl_secs,
            seed_catalogue,
        })
    }
}

/// Parse a session window in seconds, within `1..=MAX_SESSION_TTL_SECS`.
pub fn parse_session_ttl(raw: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: String| ConfigError {
        var: "ACADEMY_SESSION_TTL_SECS",
        reason,
    };

    let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if secs == 0 || secs > MAX_SESSION_TTL_SECS {
        return Err(invalid(format!(
            "expected 1..={} seconds, got {}",
            MAX_SESSION_TTL_SECS, secs
        )));
    }
    Ok(secs)
}
