//! Model definitions
//!
//! A model describes one table as the generic layer sees it: fields, foreign
//! keys and explicit indexes. Models are usually produced by
//! `#[derive(FirebirdModel)]`.

pub mod definition;
pub mod registry;

// Re-export key types
pub use definition::{FieldSpec, FieldType, ForeignKeyTarget, Model, ModelDefinition};
pub use registry::ModelRegistry;
