//! Schema module
//!
//! Schema snapshots, the operations that change them, and the Firebird rules
//! for turning model changes into DDL.

pub mod auto_index;
pub mod editor;
pub mod generator;
pub mod introspector;
pub mod types;

// Re-export key types
pub use auto_index::AutoIndexPolicy;
pub use editor::SchemaEditor;
pub use generator::MigrationGenerator;
pub use introspector::{CatalogRows, Introspector, SnapshotIntrospector};
pub use types::{Column, DatabaseSchema, ForeignKey, Index, PrimaryKey, SchemaOperation, Table};
