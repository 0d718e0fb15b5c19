//! Connection parameters
//!
//! Builds what a Firebird driver needs to open a connection from the
//! `[connection]` section of the configuration.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ConnectionSettings;
use crate::error::{Error, Result};

/// Arguments for a driver `connect` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionParams {
    /// `host/port:database` or `host:database`
    pub dsn: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub charset: String,
    pub options: BTreeMap<String, String>,
}

impl ConnectionParams {
    /// Create connection parameters from settings
    pub fn from_settings(settings: &ConnectionSettings) -> Result<Self> {
        if settings.name.trim().is_empty() {
            return Err(Error::ConfigError(
                "You need to specify a database name in the [connection] section".to_string(),
            ));
        }

        let dsn = match settings.port {
            Some(port) => format!("{}/{}:{}", settings.host, port, settings.name),
            None => format!("{}:{}", settings.host, settings.name),
        };

        tracing::debug!(dsn = %dsn, charset = %settings.charset, "Built connection parameters");

        Ok(Self {
            dsn,
            user: settings.user.clone(),
            password: settings.password.clone(),
            charset: settings.charset.clone(),
            options: settings.options.clone(),
        })
    }
}
