//! Server configuration

use serde::Deserialize;
use std::net::SocketAddr;

use super::error::ValidationError;
use crate::adapters::events::DEFAULT_MAX_CONCURRENCY;
use crate::adapters::http::webhooks::DEFAULT_BODY_LIMIT;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Largest accepted webhook body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Webhook handler tasks allowed to run at once
    #[serde(default = "default_handler_concurrency")]
    pub handler_concurrency: usize,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ValidationError::InvalidAddress(raw))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.handler_concurrency == 0 {
            return Err(ValidationError::InvalidConcurrency);
        }
        self.socket_addr()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            max_body_bytes: default_max_body_bytes(),
            handler_concurrency: default_handler_concurrency(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,boardfund=debug,sqlx=warn".to_string()
}

fn default_max_body_bytes() -> usize {
    DEFAULT_BODY_LIMIT
}

fn default_handler_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}
