//! firebird_dialect: Firebird adaptation for a generic relational layer
//!
//! The crate answers the questions a database-agnostic ORM or migration tool
//! asks its backend: how identifiers are folded and shortened, what a
//! sequence is called, how a date is truncated, and which indexes must not be
//! created because the engine already builds them for foreign keys.
//!
//! Everything here produces SQL text or operation lists; executing them is
//! left to the caller.

// lets the derive macro refer to `::firebird_dialect` from inside this crate
extern crate self as firebird_dialect;

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ops;
pub mod schema;
pub mod utils;

// Re-export main types for easier access
pub use backend::{init, parse_firebird_version, DatabaseFeatures, FirebirdBackend};
pub use config::Config;
pub use db::connection::ConnectionParams;
pub use error::{Error, Result};
pub use firebird_dialect_macros::FirebirdModel;
pub use models::{FieldSpec, FieldType, ForeignKeyTarget, Model, ModelDefinition, ModelRegistry};
pub use ops::{Connector, DatabaseOperations, SequenceNamer, TemporalUnit};
pub use schema::{
    AutoIndexPolicy, DatabaseSchema, Introspector, MigrationGenerator, SchemaEditor,
    SchemaOperation, SnapshotIntrospector,
};
pub use utils::naming::{Identifier, IdentifierPolicy};
