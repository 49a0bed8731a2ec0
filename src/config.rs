//! Service configuration.
//!
//! Values are resolved from three layers, highest precedence first:
//! command-line flags (or their environment variables), an optional YAML
//! file, and built-in defaults.
//!
//! ```yaml
//! mongo_url: mongodb://localhost:27017
//! database: FORM_BUILDER
//! host: 0.0.0.0
//! port: 8080
//! store: mongo
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::DEFAULT_DATABASE;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Which [`FormStore`](crate::storage::FormStore) backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Mongo,
    Memory,
}

/// Contents of a YAML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub mongo_url: Option<String>,
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub store: Option<StoreKind>,
}

/// Error raised while loading a config file.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_yaml::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read config file {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub mongo_url: Option<String>,
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub store: Option<StoreKind>,
}

/// Fully resolved configuration for `serve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `None` leaves a Mongo-backed service running with an unavailable store
    pub mongo_url: Option<String>,
    pub database: String,
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mongo_url: None,
            database: DEFAULT_DATABASE.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store: StoreKind::default(),
        }
    }
}

impl ServiceConfig {
    /// Layer `overrides` over `file` over the defaults.
    #[must_use]
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            mongo_url: overrides.mongo_url.or(file.mongo_url),
            database: overrides
                .database
                .or(file.database)
                .unwrap_or(defaults.database),
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            store: overrides.store.or(file.store).unwrap_or(defaults.store),
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::resolve(Overrides::default(), FileConfig::default());
        assert_eq!(config.database, "FORM_BUILDER");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.store, StoreKind::Mongo);
        assert!(config.mongo_url.is_none());
    }

    #[test]
    fn test_cli_beats_file_beats_default() {
        let file = FileConfig::parse("port: 9000\nhost: 127.0.0.1\nstore: memory\n").unwrap();
        let overrides = Overrides {
            port: Some(9100),
            ..Overrides::default()
        };
        let config = ServiceConfig::resolve(overrides, file);
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.database, DEFAULT_DATABASE);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::parse("prot: 9000\n").is_err());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(FileConfig::parse("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mongo_url: mongodb://db:27017\ndatabase: forms_test").unwrap();
        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.mongo_url.as_deref(), Some("mongodb://db:27017"));
        assert_eq!(config.database.as_deref(), Some("forms_test"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = FileConfig::load(Path::new("/nonexistent/forms.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/forms.yaml"));
    }
}
