//! TOML configuration loading.
//!
//! Any `Deserialize` type gets [`ConfigLoader`]; embed [`SharedConfig`] as a
//! `[shared]` table for the fields every binary needs.

use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Configuration file not found")]
    FileNotFound,

    /// The file could not be read, or is not valid for the target type.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// `log_level` values, spelled in lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Filter directive for `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The `[shared]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SharedConfig {
    #[serde(default)]
    pub log_level: LogLevel,
    /// Name printed in the startup banner; must not be blank.
    pub service_name: String,
}

impl SharedConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read and deserialize a TOML document. Semantic checks are up to the
/// loaded type.
pub trait ConfigLoader: Sized + DeserializeOwned {
    /// Missing files map to [`ConfigError::FileNotFound`], every other read
    /// or decode failure to [`ConfigError::ParseError`].
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound,
            _ => ConfigError::ParseError(e.to_string()),
        })?;

        tracing::debug!("Read {} bytes from {:?}", content.len(), path);
        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Level {
        level: LogLevel,
    }

    #[test]
    fn default_level_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn directive_matches_toml_spelling() {
        for name in ["trace", "debug", "info", "warn", "error"] {
            let parsed = Level::from_toml(&format!("level = \"{name}\"")).unwrap();
            assert_eq!(parsed.level.as_directive(), name);
        }
        assert!(matches!(
            Level::from_toml("level = \"loud\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn blank_service_name_is_rejected() {
        let shared = SharedConfig::from_toml("service_name = \"   \"").unwrap();
        assert_eq!(shared.log_level, LogLevel::Info);
        assert!(matches!(
            shared.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
