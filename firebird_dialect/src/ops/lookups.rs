//! Lookup operators
//!
//! Right-hand side of a filter for each lookup name. `%s` marks the parameter
//! slot; case-insensitive lookups compare against `UPPER(...)` of the value.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static OPERATORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("exact", "= %s"),
        ("iexact", "= UPPER(%s)"),
        ("contains", r"LIKE %s ESCAPE'\'"),
        ("icontains", r"LIKE UPPER(%s) ESCAPE'\'"),
        ("gt", "> %s"),
        ("gte", ">= %s"),
        ("lt", "< %s"),
        ("lte", "<= %s"),
        ("startswith", r"LIKE %s ESCAPE'\'"),
        ("endswith", r"LIKE %s ESCAPE'\'"),
        ("istartswith", r"LIKE UPPER(%s) ESCAPE'\'"),
        ("iendswith", r"LIKE UPPER(%s) ESCAPE'\'"),
        // case sensitivity of SIMILAR TO follows the column collation
        ("regex", "SIMILAR TO %s"),
        ("iregex", "SIMILAR TO %s"),
    ])
});

/// Operator template for a lookup name
pub fn lookup_operator(lookup: &str) -> Option<&'static str> {
    OPERATORS.get(lookup).copied()
}

/// All supported lookup names, sorted
pub fn lookup_names() -> Vec<&'static str> {
    let mut names: Vec<_> = OPERATORS.keys().copied().collect();
    names.sort_unstable();
    names
}
