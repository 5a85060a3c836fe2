//! Configuration module
//!
//! The service reads its settings from the environment once at startup. The
//! resulting [`Config`] is passed explicitly to the storage backend and the
//! router, so tests can build one pointing at a temporary directory.

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_UPLOAD_DIR_NAME};

/// Console log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'compact' or 'json', got '{}'",
                other
            )),
        }
    }
}

/// Service configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub host: IpAddr,
    pub server_port: u16,
    pub upload_dir: PathBuf,
    /// Optional cap on request bodies. `None` leaves uploads unbounded.
    pub max_upload_bytes: Option<usize>,
    pub environment: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let host = lookup("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| anyhow::anyhow!("HOST must be a valid IP address: {}", e))?;

        let upload_dir = match lookup("UPLOAD_DIR") {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
            _ => default_upload_dir(),
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<usize>().map_err(
                |_| anyhow::anyhow!("MAX_UPLOAD_BYTES must be a positive integer, got '{}'", raw),
            )?),
            _ => None,
        };

        let log_format = lookup("LOG_FORMAT")
            .map(|raw| raw.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let config = Config {
            host,
            server_port,
            upload_dir,
            max_upload_bytes,
            environment,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a given upload directory with every other value at its default.
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Config {
            host: IpAddr::from([0, 0, 0, 0]),
            server_port: DEFAULT_PORT,
            upload_dir: upload_dir.into(),
            max_upload_bytes: None,
            environment: "development".to_string(),
            log_format: LogFormat::Compact,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_bytes == Some(0) {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_BYTES must be greater than zero when set"
            ));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR must not be empty"));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn bind_address(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.host, self.server_port)
    }
}

/// `uploads/` next to the running executable, falling back to the working directory.
fn default_upload_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_UPLOAD_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR_NAME))
}
