use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::Level;

use crate::codec::DEFAULT_MAX_HEADER_BYTES;
use crate::error::ServeError;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";

/// Server settings, usually read from a TOML file. Missing keys take their default.
///
/// ```toml
/// address = "0.0.0.0:3000"
/// max_header_bytes = 16384
/// log_level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub address: String,
    pub max_header_bytes: usize,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_owned(),
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            log_level: "info".to_owned(),
        }
    }
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns [`ServeError::Config`] if `content` isn't valid TOML for this struct.
    pub fn from_toml_str(content: &str) -> Result<Self, ServeError> {
        Ok(toml::from_str(content)?)
    }

    /// # Errors
    ///
    /// Returns [`ServeError::Io`] if the file can't be read, [`ServeError::Config`] if it can't be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// # Errors
    ///
    /// Returns [`ServeError::InvalidLogLevel`] if `log_level` isn't a tracing level name.
    pub fn level(&self) -> Result<Level, ServeError> {
        Level::from_str(&self.log_level).map_err(|_| ServeError::InvalidLogLevel { value: self.log_level.clone() })
    }
}
