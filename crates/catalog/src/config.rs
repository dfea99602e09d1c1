//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_MONGODB_URL` - MongoDB connection string
//!
//! ## Optional
//! - `CATALOG_DATABASE` - Database name (default: threadline)
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` - Listen port (default: 3000)
//! - `CATALOG_CACHE_TTL_SECS` - Read-cache TTL in seconds (default: 300)
//! - `CATALOG_CACHE_CAPACITY` - Maximum cached responses (default: 1000)
//! - `FRONTEND_URL` - CORS allow-origin (default: any origin)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog application configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// MongoDB connection URL (contains credentials)
    pub mongodb_url: SecretString,
    /// Database holding the `products` and `categories` collections
    pub database: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// TTL for cached collection/detail reads, in seconds
    pub cache_ttl_secs: u64,
    /// Maximum number of cached responses
    pub cache_capacity: u64,
    /// Allowed CORS origin; `None` means any origin
    pub frontend_url: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

impl CatalogConfig {
    /// Load the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            mongodb_url: SecretString::from(required("CATALOG_MONGODB_URL")?),
            database: optional("CATALOG_DATABASE")
                .unwrap_or_else(|| "threadline".to_owned()),
            host: parse_or("CATALOG_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or("CATALOG_PORT", 3000)?,
            cache_ttl_secs: parse_or("CATALOG_CACHE_TTL_SECS", 300)?,
            cache_capacity: parse_or("CATALOG_CACHE_CAPACITY", 1000)?,
            frontend_url: optional("FRONTEND_URL"),
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// The socket address to bind the listener to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    optional(name).map_or(Ok(default), |raw| {
        raw.parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_owned(), e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CatalogConfig {
        CatalogConfig {
            mongodb_url: SecretString::from("mongodb://localhost:27017".to_owned()),
            database: "threadline".to_owned(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            cache_ttl_secs: 300,
            cache_capacity: 1000,
            frontend_url: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        assert_eq!(config().socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn debug_output_redacts_the_connection_string() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("27017"));
    }
}
