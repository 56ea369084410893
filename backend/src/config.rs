//! Service configuration.
//!
//! Values come from an optional TOML file (`subject_placeholders.toml` in the
//! working directory, or the path named by `SUBJECT_PLACEHOLDERS_CONFIG`),
//! then individual environment variables override single fields. A missing
//! file is not an error; defaults apply.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "subject_placeholders.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// What the campaign start hook does when the attribute directory cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryErrorPolicy {
    /// Continue with no known attributes; the subject goes out unsubstituted.
    #[default]
    FailOpen,
    /// Report the failure back to the sending pipeline.
    Surface,
}

impl std::str::FromStr for DirectoryErrorPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_open" | "fail-open" => Ok(Self::FailOpen),
            "surface" => Ok(Self::Surface),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database holding attribute definitions and recipient values.
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("subscribers.sqlite"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub on_directory_error: DirectoryErrorPolicy,
}

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SUBJECT_PLACEHOLDERS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("SUBJECT_PLACEHOLDERS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SUBJECT_PLACEHOLDERS_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "SUBJECT_PLACEHOLDERS_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(db) = var("SUBJECT_PLACEHOLDERS_DATABASE") {
            self.store.database_path = PathBuf::from(db);
        }
        if let Some(policy) = var("SUBJECT_PLACEHOLDERS_ON_DIRECTORY_ERROR") {
            self.on_directory_error = policy.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "SUBJECT_PLACEHOLDERS_ON_DIRECTORY_ERROR",
                value: policy.clone(),
            })?;
        }
        Ok(())
    }
}
