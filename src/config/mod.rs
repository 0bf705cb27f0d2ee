//! Configuration management.
//!
//! Settings come from a TOML file (an explicit `--config` path or the
//! platform config directory), then from environment variables, which
//! override the file. A `.env` file in the working directory is loaded
//! into the environment first.

use crate::io::DEFAULT_CHUNK_SIZE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the database path.
pub const ENV_DATABASE: &str = "ROSTER_DATABASE";
/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "ROSTER_DATA_DIR";
/// Environment variable overriding the backup directory.
pub const ENV_BACKUP_DIR: &str = "ROSTER_BACKUP_DIR";
/// Environment variable overriding the import chunk size.
pub const ENV_CHUNK_SIZE: &str = "ROSTER_CHUNK_SIZE";
/// Environment variable overriding the HTTP port.
pub const ENV_PORT: &str = "ROSTER_PORT";
/// Environment variable naming a config file.
pub const ENV_CONFIG_PATH: &str = "ROSTER_CONFIG_PATH";

/// Main configuration for roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterConfig {
    /// Path to the `SQLite` database file.
    pub database: PathBuf,
    /// Directory scanned by the directory loader.
    pub data_dir: PathBuf,
    /// Directory holding backup files.
    pub backup_dir: PathBuf,
    /// Records per import chunk.
    pub chunk_size: usize,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// Filter directives, e.g. `roster=debug`.
    pub filter: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Database path.
    pub database: Option<String>,
    /// Data directory.
    pub data_dir: Option<String>,
    /// Backup directory.
    pub backup_dir: Option<String>,
    /// Chunk size.
    pub chunk_size: Option<usize>,
    /// Server section.
    pub server: Option<ConfigFileServer>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// Server section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileServer {
    /// Bind address.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("data/roster.db"),
            data_dir: PathBuf::from("data"),
            backup_dir: PathBuf::from("backups"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            server: ServerConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl RosterConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::operation("read_config_file", format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| Error::Configuration(format!("invalid config file: {e}")))?;
        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir (`~/.config/roster/config.toml` on
    /// Linux). Returns default configuration if no config file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be loaded.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Returns the platform-specific config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "roster")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Converts a `ConfigFile` to `RosterConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(database) = file.database {
            config.database = PathBuf::from(database);
        }
        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(backup_dir) = file.backup_dir {
            config.backup_dir = PathBuf::from(backup_dir);
        }
        if let Some(chunk_size) = file.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(server) = file.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config.validate()?;
        Ok(config)
    }

    /// Applies `ROSTER_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a numeric override does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by `lookup`; blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a numeric override does not parse.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(database) = get(ENV_DATABASE) {
            self.database = PathBuf::from(database);
        }
        if let Some(data_dir) = get(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(backup_dir) = get(ENV_BACKUP_DIR) {
            self.backup_dir = PathBuf::from(backup_dir);
        }
        if let Some(chunk_size) = get(ENV_CHUNK_SIZE) {
            self.chunk_size = parse_env(ENV_CHUNK_SIZE, &chunk_size)?;
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = parse_env(ENV_PORT, &port)?;
        }

        self.validate()
    }

    /// Checks settings that would make every import fail.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the chunk size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Configuration(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = path.into();
        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the backup directory.
    #[must_use]
    pub fn with_backup_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_dir = path.into();
        self
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::operation("serialize_config", e))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Configuration(format!("{key}={value}: {e}")))
}
