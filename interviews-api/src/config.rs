//! Server configuration, loaded from an optional TOML file.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no secret is configured.
pub const JWT_SECRET_ENV: &str = "INTERVIEWS_JWT_SECRET";

const DEV_JWT_SECRET: &str = "interviews-development-secret";

/// Backend for the three collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// sled database under `data_dir`.
    #[default]
    Sled,
    /// Process memory; lost on exit.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,

    /// HS256 signing secret. Falls back to [`JWT_SECRET_ENV`].
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default)]
    pub store: StoreKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            http_addr: default_http_addr(),
            jwt_secret: None,
            store: StoreKind::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// The configured secret, else the environment, else the development default.
    pub fn resolve_jwt_secret(&self) -> String {
        self.jwt_secret_or(std::env::var(JWT_SECRET_ENV).ok())
    }

    fn jwt_secret_or(&self, from_env: Option<String>) -> String {
        match self.jwt_secret.clone().or(from_env) {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!(
                    "no JWT secret configured (set {} or jwt_secret); using the development default",
                    JWT_SECRET_ENV
                );
                DEV_JWT_SECRET.to_string()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    IoError(String),
    #[error("failed to parse config: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.http_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.store, StoreKind::Sled);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn reads_every_field_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
data_dir = "/var/lib/interviews"
http_addr = "0.0.0.0:8080"
jwt_secret = "s3cret"
store = "memory"
"#
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/interviews"));
        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.resolve_jwt_secret(), "s3cret");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_toml_str("store = \"postgres\""),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ServerConfig::from_file("/definitely/not/here.toml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn secret_precedence() {
        let mut config = ServerConfig::default();
        assert_eq!(config.jwt_secret_or(Some("env".into())), "env");
        assert_eq!(config.jwt_secret_or(None), DEV_JWT_SECRET);

        config.jwt_secret = Some("file".into());
        assert_eq!(config.jwt_secret_or(Some("env".into())), "file");
    }
}
