//! Configuration handling for the Firebird dialect layer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

use crate::error::{Error, Result};

/// Smallest identifier budget that still leaves room for a hashed suffix.
const MIN_IDENTIFIER_LENGTH: usize = 16;

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    config.validate()?;
    Ok(config)
}

/// Represents the complete configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub dialect: DialectConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Check the settings that other components rely on
    pub fn validate(&self) -> Result<()> {
        let dialect = &self.dialect;
        if dialect.max_identifier_length < MIN_IDENTIFIER_LENGTH {
            return Err(Error::ConfigError(format!(
                "max_identifier_length must be at least {}, got {}",
                MIN_IDENTIFIER_LENGTH, dialect.max_identifier_length
            )));
        }

        for suffix in [&dialect.sequence_suffix, &dialect.trigger_suffix] {
            if suffix.is_empty() || suffix.len() >= dialect.max_identifier_length / 2 {
                return Err(Error::ConfigError(format!(
                    "Suffix {:?} does not fit the identifier length of {}",
                    suffix, dialect.max_identifier_length
                )));
            }
        }

        if !self.naming.index_pattern.contains("{table}") {
            return Err(Error::ConfigError(
                "index_pattern must contain the {table} placeholder".to_string(),
            ));
        }

        if !self.naming.foreign_key_pattern.contains("{table}") {
            return Err(Error::ConfigError(
                "foreign_key_pattern must contain the {table} placeholder".to_string(),
            ));
        }

        Ok(())
    }
}

/// Database connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: Option<u16>,
    pub name: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub charset: String,
    pub options: BTreeMap<String, String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            name: String::new(),
            user: None,
            password: None,
            charset: "UTF8".to_string(),
            options: BTreeMap::new(),
        }
    }
}

/// Engine-specific dialect settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DialectConfig {
    pub max_identifier_length: usize,
    pub sequence_suffix: String,
    pub trigger_suffix: String,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            max_identifier_length: 31,
            sequence_suffix: "_SQ".to_string(),
            trigger_suffix: "_TR".to_string(),
        }
    }
}

/// Naming patterns for generated schema objects
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NamingConfig {
    pub index_pattern: String,
    pub foreign_key_pattern: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            index_pattern: "{table}_{columns}_IDX".to_string(),
            foreign_key_pattern: "{table}_{column}_FK".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults_match_engine_limits() {
        let config = Config::default();

        assert_eq!(config.dialect.max_identifier_length, 31);
        assert_eq!(config.dialect.sequence_suffix, "_SQ");
        assert_eq!(config.connection.charset, "UTF8");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [connection]
            host = "db.internal"
            port = 3050
            name = "/var/lib/firebird/data/app.fdb"
            user = "SYSDBA"

            [dialect]
            max_identifier_length = 63

            [logging]
            level = "debug"
            format = "json"
            stdout = true
            "#
        )
        .unwrap();

        let config = load_from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.connection.port, Some(3050));
        assert_eq!(config.connection.user.as_deref(), Some("SYSDBA"));
        assert_eq!(config.dialect.max_identifier_length, 63);
        assert_eq!(config.dialect.trigger_suffix, "_TR");
        assert_eq!(config.naming.index_pattern, "{table}_{columns}_IDX");
        assert_eq!(config.logging.unwrap().format, "json");
    }

    #[test]
    fn test_rejects_tiny_identifier_budget() {
        let mut config = Config::default();
        config.dialect.max_identifier_length = 8;

        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_from_file("/nonexistent/firebird.toml");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
