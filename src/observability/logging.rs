//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor the config sets one.
const DEFAULT_FILTER: &str = "info";
/// Filter used with `--verbose`.
const VERBOSE_FILTER: &str = "debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(crate::Error::Configuration(format!(
                "unknown log format: {other}"
            ))),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
    /// Event filter.
    pub filter: EnvFilter,
}

impl LoggingConfig {
    /// Resolves logging settings.
    ///
    /// The filter is chosen from, in order: `--verbose`, `RUST_LOG`, the
    /// config file, the default. An unrecognized format falls back to
    /// pretty output.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        let format = settings
            .and_then(|s| s.format.as_deref())
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();
        let file = settings.and_then(|s| s.file.clone());

        let filter = if verbose {
            EnvFilter::new(VERBOSE_FILTER)
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                settings
                    .and_then(|s| s.filter.as_deref())
                    .and_then(|f| EnvFilter::try_new(f).ok())
                    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
            })
        };

        Self {
            format,
            file,
            filter,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            file: None,
            filter: EnvFilter::new(DEFAULT_FILTER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingSettings {
            format: Some("json".to_string()),
            file: Some(PathBuf::from("logs/roster.log")),
            filter: Some("roster=trace".to_string()),
        };
        let config = LoggingConfig::from_settings(Some(&settings), true);

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("logs/roster.log")));
        assert_eq!(config.filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_defaults_without_settings() {
        let config = LoggingConfig::from_settings(None, false);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let settings = LoggingSettings {
            format: Some("xml".to_string()),
            ..LoggingSettings::default()
        };
        assert_eq!(
            LoggingConfig::from_settings(Some(&settings), false).format,
            LogFormat::Pretty
        );
    }
}
