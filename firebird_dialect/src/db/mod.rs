//! Driver-facing helpers
//!
//! Connection parameters and the cursor-level translation the executing
//! layer applies around every statement. No I/O happens here.

pub mod connection;
pub mod cursor;

// Re-export key types
pub use connection::ConnectionParams;
pub use cursor::{convert_query, translate_database_error};
