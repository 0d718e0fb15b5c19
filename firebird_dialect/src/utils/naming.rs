//! Identifier rules for Firebird
//!
//! Firebird folds unquoted identifiers to upper case and limits them to 31
//! bytes (before 4.0). Everything the dialect emits goes through
//! [`IdentifierPolicy`] so the same logical name always maps to the same
//! engine identifier.

use inflector::Inflector;
use std::fmt;

use crate::config::DialectConfig;
use crate::error::{Error, Result};

/// Hex digits of the name hash kept in a truncated identifier
const HASH_LENGTH: usize = 8;

/// A normalized engine identifier, safe to embed between double quotes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier wrapped in double quotes
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Case-folding, truncation and quoting rules for engine identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierPolicy {
    max_length: usize,
}

impl Default for IdentifierPolicy {
    fn default() -> Self {
        Self { max_length: 31 }
    }
}

impl IdentifierPolicy {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn from_config(config: &DialectConfig) -> Self {
        Self::new(config.max_identifier_length)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Normalize a raw name into an engine identifier
    pub fn normalize(&self, raw: &str) -> Result<Identifier> {
        self.normalize_with_max(raw, self.max_length)
    }

    /// Normalize a raw name into an identifier of at most `max_length` bytes.
    ///
    /// Used when the caller appends a fixed suffix afterwards.
    pub fn normalize_with_max(&self, raw: &str, max_length: usize) -> Result<Identifier> {
        if max_length == 0 {
            return Err(Error::UnknownIdentifier(format!(
                "{} (no room left in the identifier length)",
                raw
            )));
        }
        let folded = fold(raw)?;
        Ok(Identifier(truncate_identifier(&folded, max_length)))
    }

    /// Normalize and wrap in double quotes
    pub fn quote(&self, raw: &str) -> Result<String> {
        Ok(self.normalize(raw)?.quoted())
    }

    /// Quote a column list, preserving order
    pub fn quote_all(&self, names: &[String]) -> Result<String> {
        let quoted = names
            .iter()
            .map(|name| self.quote(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(quoted.join(", "))
    }
}

/// Strip one level of quoting, trim and upper-case a raw name
fn fold(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        return Err(Error::UnknownIdentifier(raw.to_string()));
    }

    Ok(unquoted.replace('"', "_").to_uppercase())
}

/// Truncate an identifier to fit database limits
///
/// Long names keep as much of their prefix as fits, followed by `_` and the
/// first hex digits of the MD5 of the full name.
pub fn truncate_identifier(name: &str, max_length: usize) -> String {
    if name.len() <= max_length {
        return name.to_string();
    }

    let hash = format!("{:X}", md5::compute(name.as_bytes()));
    if max_length <= HASH_LENGTH + 1 {
        return hash[..max_length.min(hash.len())].to_string();
    }

    // Calculate how much of the original name we can keep
    let keep_length = max_length - HASH_LENGTH - 1;
    let mut prefix = String::with_capacity(keep_length);
    for c in name.chars() {
        if prefix.len() + c.len_utf8() > keep_length {
            break;
        }
        prefix.push(c);
    }

    format!("{}_{}", prefix, &hash[..HASH_LENGTH])
}

/// Format a name according to a pattern with placeholders
pub fn format_name(pattern: &str, replacements: &[(&str, &str)]) -> String {
    let mut result = pattern.to_string();

    for (placeholder, value) in replacements {
        result = result.replace(&format!("{{{}}}", placeholder), value);
    }

    result
}

/// Get index name from table and columns according to pattern
pub fn get_index_name(pattern: &str, table_name: &str, columns: &[String]) -> String {
    let columns_str = columns.join("_");

    format_name(pattern, &[("table", table_name), ("columns", &columns_str)])
}

/// Get foreign key constraint name according to pattern
pub fn get_foreign_key_name(pattern: &str, table_name: &str, column_name: &str) -> String {
    format_name(pattern, &[("table", table_name), ("column", column_name)])
}

/// Default table name for a model: the snake-cased model name
pub fn table_name_for_model(model_name: &str) -> String {
    model_name.to_snake_case()
}
