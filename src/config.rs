//! Server configuration from environment variables.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Runtime configuration for the HTTP server and storage.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the HTTP/WebSocket server on.
    pub port: u16,
    /// Path of the local database file.
    pub db_path: PathBuf,
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults.
    ///
    /// `SUPPORTLINE_PORT` takes precedence over the generic `PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("SUPPORTLINE_PORT").or_else(|_| std::env::var("PORT")) {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SUPPORTLINE_PORT".into(),
                message: format!("not a valid port: {raw}"),
            })?,
            Err(_) => 8000,
        };

        let db_path = std::env::var("SUPPORTLINE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/supportline.db"));

        Ok(Self { port, db_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_env_unset() {
        // Env vars are process-global; only assert the fallback path when
        // nothing in the test environment overrides them.
        if std::env::var("SUPPORTLINE_PORT").is_err() && std::env::var("PORT").is_err() {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.port, 8000);
        }
    }
}
