use crate::error::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP service listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Connection parameters for the relational store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// A sqlx connection string, e.g. `sqlite://bookshelf.db?mode=rwc`.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// How long a request waits for a pooled connection before failing.
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Settings {
    /// Rejects values that would only fail later at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must be non-zero".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError("database.url must be set".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "server address '{}:{}' is not a valid socket address",
                self.host, self.port
            ))
        })
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}
