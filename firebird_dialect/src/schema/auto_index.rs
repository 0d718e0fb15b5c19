//! Implicit index behavior of Firebird
//!
//! Firebird backs every foreign key constraint with an index on the source
//! columns (named `RDB$FOREIGN<n>`). A generic migration layer that pairs each
//! foreign key with an explicit `CREATE INDEX` would build a second, redundant
//! index, so every index decision is checked here first.

use crate::schema::types::{same_columns, ForeignKey, Index, Table};

/// Decides which indexes the engine creates on its own.
///
/// [`Index`] and [`ForeignKey`] do not record their table. The slice-based
/// checks therefore trust the caller to pass only foreign keys of the index's
/// table; [`AutoIndexPolicy::is_auto_created_on`] takes the table itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoIndexPolicy;

impl AutoIndexPolicy {
    pub fn new() -> Self {
        Self
    }

    /// True when a foreign key on the same table already yields this index.
    ///
    /// `foreign_keys` must belong to the index's table. Column order matters
    /// because the engine indexes columns in declaration order.
    pub fn is_auto_created(&self, index: &Index, foreign_keys: &[ForeignKey]) -> bool {
        foreign_keys
            .iter()
            .any(|fk| same_columns(&fk.columns, &index.columns))
    }

    /// Same check against the foreign keys a snapshot table already holds
    pub fn is_auto_created_on(&self, table: &Table, index: &Index) -> bool {
        self.is_auto_created(index, &table.foreign_keys)
    }

    /// Keep only the indexes that need an explicit `CREATE INDEX`
    pub fn retain_explicit(
        &self,
        table: &str,
        indexes: Vec<Index>,
        foreign_keys: &[ForeignKey],
    ) -> Vec<Index> {
        indexes
            .into_iter()
            .filter(|index| {
                let implicit = self.is_auto_created(index, foreign_keys);
                if implicit {
                    tracing::debug!(
                        table = table,
                        index = %index.name,
                        columns = ?index.columns,
                        "Skipping index created implicitly by a foreign key"
                    );
                }
                !implicit
            })
            .collect()
    }
}
