//! # Service Configuration
//!
//! Read once from the environment at start-up; CLI flags may override
//! individual fields before the state is built.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `PTW_BIND_ADDR` | `0.0.0.0:8080` | Listen address |
//! | `PTW_AUTH_TOKEN` | unset | Shared bearer token for `/v1`; unset disables the check |
//! | `DATABASE_URL` | unset | Postgres journal; unset runs in memory only |
//! | `PTW_POLICY_FILE` | unset | YAML capability table; unset uses the built-in table |
//! | `PTW_PERMIT_PREFIX` | `PTW` | Permit number prefix |
//! | `PTW_METRICS_ENABLED` | `true` | Mount `/metrics` and record HTTP metrics |
//! | `PTW_LOG_JSON` | `false` | JSON log lines |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration.
///
/// Custom `Debug` redacts the token and database URL.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub auth_token: Option<String>,
    pub database_url: Option<String>,
    pub policy_file: Option<PathBuf>,
    pub permit_prefix: String,
    pub metrics_enabled: bool,
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("policy_file", &self.policy_file)
            .field("permit_prefix", &self.permit_prefix)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            auth_token: None,
            database_url: None,
            policy_file: None,
            permit_prefix: ptw_engine::DEFAULT_PREFIX.to_string(),
            metrics_enabled: true,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match non_empty("PTW_BIND_ADDR") {
            Some(value) => value.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "PTW_BIND_ADDR",
                value: value.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.bind_addr,
        };

        Ok(Self {
            bind_addr,
            auth_token: non_empty("PTW_AUTH_TOKEN"),
            database_url: non_empty("DATABASE_URL"),
            policy_file: non_empty("PTW_POLICY_FILE").map(PathBuf::from),
            permit_prefix: non_empty("PTW_PERMIT_PREFIX").unwrap_or(defaults.permit_prefix),
            metrics_enabled: flag(non_empty("PTW_METRICS_ENABLED"), true, "PTW_METRICS_ENABLED")?,
            log_json: flag(non_empty("PTW_LOG_JSON"), false, "PTW_LOG_JSON")?,
        })
    }
}

fn flag(value: Option<String>, default: bool, var: &'static str) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            var,
            value: other.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
