//! Configuration for the relayer.

use axum::http::HeaderValue;
use thiserror::Error;

/// Which `Origin` headers may open a WebSocket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    Any,
    Exact(HeaderValue),
}

impl OriginPolicy {
    /// Returns true when a request carrying `origin` may upgrade.
    /// Under `Exact`, a request without an `Origin` header is refused.
    pub fn allows(&self, origin: Option<&HeaderValue>) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(allowed) => origin == Some(allowed),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("invalid INTAKE_CAPACITY: {0} (must be at least 1)")]
    InvalidCapacity(String),
    #[error("invalid ALLOWED_ORIGIN: {0}")]
    InvalidOrigin(String),
}

/// Relayer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ws_path: String,
    pub origin_policy: OriginPolicy,
    /// Messages that may wait for the broadcaster before ingress loops block.
    pub intake_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ws_path: "/ws".to_string(),
            origin_policy: OriginPolicy::Any,
            intake_capacity: 1,
        }
    }
}

impl Config {
    /// Read HOST, PORT, WS_PATH, ALLOWED_ORIGIN and INTAKE_CAPACITY.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = match lookup("PORT") {
            Some(p) => p.trim().parse().map_err(|_| ConfigError::InvalidPort(p))?,
            None => defaults.port,
        };
        let ws_path = match lookup("WS_PATH") {
            Some(p) if p.starts_with('/') => p,
            Some(p) => format!("/{}", p),
            None => defaults.ws_path,
        };
        let origin_policy = match lookup("ALLOWED_ORIGIN").filter(|o| !o.trim().is_empty()) {
            Some(o) => OriginPolicy::Exact(
                HeaderValue::from_str(o.trim()).map_err(|_| ConfigError::InvalidOrigin(o))?,
            ),
            None => OriginPolicy::Any,
        };
        let intake_capacity = match lookup("INTAKE_CAPACITY") {
            Some(c) => match c.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidCapacity(c)),
            },
            None => defaults.intake_capacity,
        };

        Ok(Self {
            host,
            port,
            ws_path,
            origin_policy,
            intake_capacity,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
