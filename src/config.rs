//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GOOGLE_APPLICATION_CREDENTIALS` - Path to the service-account key JSON
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 8080)
//! - `ALLOWED_ORIGIN` - CORS origin for the browser frontend
//!   (default: `http://localhost:5173`)
//! - `STORE_TIMEOUT_SECS` - Firestore request timeout (default: 30)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Path to the service-account key JSON file
    pub credentials_path: String,
    /// Origin allowed by CORS (the browser frontend)
    pub allowed_origin: String,
    /// Per-request timeout for store round-trips
    pub store_timeout: Duration,
}

impl Config {
    /// Loads configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let credentials_path = optional("GOOGLE_APPLICATION_CREDENTIALS")
            .ok_or(ConfigError::MissingEnvVar("GOOGLE_APPLICATION_CREDENTIALS"))?;

        let host = match optional("HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("HOST", format!("{e}: {raw}")))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("PORT", format!("{e}: {raw}")))?,
            None => 8080,
        };

        let allowed_origin =
            optional("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        let store_timeout = match optional("STORE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_TIMEOUT_SECS", format!("{e}: {raw}"))
            })?),
            None => Duration::from_secs(30),
        };

        Ok(Self {
            host,
            port,
            credentials_path,
            allowed_origin,
            store_timeout,
        })
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
