//! Cursor-level translation
//!
//! The generic layer writes `%s` placeholders; Firebird drivers take `?`.
//! Driver failures carry an SQLCODE which decides the error family.

use crate::error::{Error, Result};

/// SQLCODEs reported for constraint violations: -803 duplicate key, -625
/// NOT NULL violation
pub const INTEGRITY_ERROR_CODES: [i32; 2] = [-803, -625];

/// Rewrite `%s` placeholders as `?` and `%%` as a literal `%`.
///
/// A statement without parameters is passed through untouched, so literal
/// `%` signs in hand-written SQL survive.
pub fn convert_query(query: &str, num_params: usize) -> Result<String> {
    if num_params == 0 {
        return Ok(query.to_string());
    }

    let mut converted = String::with_capacity(query.len());
    let mut placeholders = 0;
    let mut chars = query.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            converted.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => {
                converted.push('?');
                placeholders += 1;
            }
            Some('%') => converted.push('%'),
            Some(other) => {
                return Err(Error::SyntaxError(format!(
                    "Unsupported format character '{}' in query: {}",
                    other, query
                )))
            }
            None => {
                return Err(Error::SyntaxError(format!(
                    "Incomplete format at end of query: {}",
                    query
                )))
            }
        }
    }

    if placeholders != num_params {
        return Err(Error::SyntaxError(format!(
            "Query has {} placeholders but {} parameters were given: {}",
            placeholders, num_params, query
        )));
    }

    Ok(converted)
}

/// Classify a driver failure by its SQLCODE
pub fn translate_database_error(sqlcode: i32, message: &str, query: &str) -> Error {
    let detail = format!("{} ({} -- {})", message.trim(), sqlcode, query);

    if INTEGRITY_ERROR_CODES.contains(&sqlcode) {
        tracing::debug!(sqlcode = sqlcode, "Constraint violation");
        Error::IntegrityError(detail)
    } else {
        tracing::debug!(sqlcode = sqlcode, "Database error");
        Error::DatabaseError(detail)
    }
}
