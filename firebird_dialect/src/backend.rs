//! Backend facade
//!
//! Bundles the dialect pieces a generic ORM layer asks a backend for: the
//! operations object, the feature flags and a schema editor per snapshot.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::{self, Config};
use crate::db::connection::ConnectionParams;
use crate::error::{Error, Result};
use crate::ops::DatabaseOperations;
use crate::schema::editor::SchemaEditor;
use crate::schema::introspector::Introspector;
use crate::schema::types::DatabaseSchema;
use crate::utils::logging::init_logging;

static SERVER_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Firebird\s+(\d+(?:\.\d+)*)").expect("server version pattern is valid")
});

/// What the generic layer may assume about the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseFeatures {
    pub allows_group_by_pk: bool,
    pub supports_forward_references: bool,
    pub has_bulk_insert: bool,
    pub can_return_id_from_insert: bool,
    pub has_select_for_update: bool,
    pub supports_tablespaces: bool,
    pub supports_timezones: bool,
    pub supports_transactions: bool,
    /// Foreign keys come with their own index
    pub creates_foreign_key_indexes: bool,
}

impl Default for DatabaseFeatures {
    fn default() -> Self {
        Self {
            allows_group_by_pk: false,
            // constraints are checked immediately, never deferred
            supports_forward_references: false,
            has_bulk_insert: false,
            can_return_id_from_insert: true,
            has_select_for_update: true,
            supports_tablespaces: false,
            supports_timezones: false,
            supports_transactions: true,
            creates_foreign_key_indexes: true,
        }
    }
}

/// Firebird backend for the generic layer
#[derive(Debug, Clone)]
pub struct FirebirdBackend {
    config: Config,
    ops: DatabaseOperations,
    features: DatabaseFeatures,
}

/// Load the configuration file, set up logging and build the backend
pub fn init(config_path: &str) -> Result<FirebirdBackend> {
    let config = config::load_from_file(config_path)?;
    init_logging(&config.logging)?;
    FirebirdBackend::new(config)
}

impl FirebirdBackend {
    /// Create a backend from configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let ops = DatabaseOperations::new(&config.dialect);

        tracing::info!(
            max_identifier_length = config.dialect.max_identifier_length,
            sequence_suffix = %config.dialect.sequence_suffix,
            "Firebird backend ready"
        );

        Ok(Self {
            config,
            ops,
            features: DatabaseFeatures::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ops(&self) -> &DatabaseOperations {
        &self.ops
    }

    pub fn features(&self) -> &DatabaseFeatures {
        &self.features
    }

    pub fn connection_params(&self) -> Result<ConnectionParams> {
        ConnectionParams::from_settings(&self.config.connection)
    }

    /// Schema editor bound to a snapshot
    pub fn schema_editor(&self, snapshot: DatabaseSchema) -> SchemaEditor {
        SchemaEditor::new(snapshot, &self.config)
    }

    /// Schema editor bound to a fresh snapshot from `introspector`
    pub async fn introspect_editor(&self, introspector: &dyn Introspector) -> Result<SchemaEditor> {
        SchemaEditor::introspect(introspector, &self.config).await
    }
}

/// Parse the engine version out of a server version string such as
/// `WI-V6.3.5.4926 Firebird 1.5`
pub fn parse_firebird_version(server_version: &str) -> Result<Vec<u32>> {
    let raw = match SERVER_VERSION.captures(server_version) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => server_version.split_whitespace().last().unwrap_or(""),
    };

    raw.split('.')
        .map(|part| part.parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| {
            Error::DatabaseError(format!(
                "Unable to determine Firebird version from {:?}",
                server_version
            ))
        })
}
