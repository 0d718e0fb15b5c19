//! Utilities for the Firebird dialect layer
//!
//! Identifier normalization and logging setup used across the crate.

pub mod logging;
pub mod naming;

// Re-export key utility types and functions
pub use naming::{
    format_name, get_foreign_key_name, get_index_name, table_name_for_model,
    truncate_identifier, Identifier, IdentifierPolicy,
};
