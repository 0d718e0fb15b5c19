//! Type definitions for database schema objects

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Point-in-time view of the database schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub tables: IndexMap<String, Table>,
}

impl DatabaseSchema {
    /// Create a new empty database schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the schema, replacing any table of the same name
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Look up a table by its normalized name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Represents a database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Set the primary key for the table
    pub fn set_primary_key(&mut self, pk: PrimaryKey) {
        self.primary_key = Some(pk);
    }

    /// Add an index to the table
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// Add a foreign key to the table
    pub fn add_foreign_key(&mut self, fk: ForeignKey) {
        self.foreign_keys.push(fk);
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Foreign keys whose source columns include `column`
    pub fn foreign_keys_on<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a ForeignKey> + 'a {
        self.foreign_keys
            .iter()
            .filter(move |fk| fk.columns.iter().any(|c| c == column))
    }
}

/// Represents a database column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub is_unique: bool,
}

impl Column {
    /// Create a new column with the given name and type
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: false,
            default: None,
            is_unique: false,
        }
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set a default value for the column
    pub fn default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.is_unique = unique;
        self
    }
}

/// Represents a primary key constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Represents an index.
///
/// Two indexes on the same table are equivalent when their column lists match,
/// whatever their names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

impl Index {
    pub fn new(name: &str, columns: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            is_unique: false,
        }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.is_unique = unique;
        self
    }

    pub fn is_equivalent(&self, other: &Index) -> bool {
        same_columns(&self.columns, &other.columns)
    }

    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Represents a foreign key constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// Ordered, case-insensitive column list comparison
pub(crate) fn same_columns(left: &[String], right: &[String]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| l.eq_ignore_ascii_case(r))
}

/// A single DDL-level change, the unit the schema editor emits.
///
/// All names are normalized engine identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SchemaOperation {
    AddColumn { table: String, column: Column },
    DropColumn { table: String, column: String },
    AddForeignKey { table: String, foreign_key: ForeignKey },
    DropForeignKey { table: String, name: String },
    CreateIndex { table: String, index: Index },
    DropIndex { table: String, name: String },
}

impl SchemaOperation {
    pub fn table(&self) -> &str {
        match self {
            SchemaOperation::AddColumn { table, .. }
            | SchemaOperation::DropColumn { table, .. }
            | SchemaOperation::AddForeignKey { table, .. }
            | SchemaOperation::DropForeignKey { table, .. }
            | SchemaOperation::CreateIndex { table, .. }
            | SchemaOperation::DropIndex { table, .. } => table,
        }
    }

    pub fn is_index_creation(&self) -> bool {
        matches!(self, SchemaOperation::CreateIndex { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_equivalence_ignores_name() {
        let a = Index::new("BAR_A_IDX", vec!["A".to_string()]);
        let b = Index::new("RDB$FOREIGN12", vec!["a".to_string()]);
        let c = Index::new("BAR_AB_IDX", vec!["A".to_string(), "B".to_string()]);

        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&c));
    }

    #[test]
    fn test_column_order_matters() {
        let ab = vec!["A".to_string(), "B".to_string()];
        let ba = vec!["B".to_string(), "A".to_string()];
        assert!(!same_columns(&ab, &ba));
    }

    #[test]
    fn test_snapshot_json_keeps_table_order() {
        let mut schema = DatabaseSchema::new();
        schema.add_table(Table::new("ZETA"));
        schema.add_table(Table::new("ALPHA"));

        let restored = DatabaseSchema::from_json(&schema.to_json().unwrap()).unwrap();
        let names: Vec<_> = restored.tables.keys().cloned().collect();

        assert_eq!(names, vec!["ZETA".to_string(), "ALPHA".to_string()]);
        assert_eq!(restored, schema);
    }

    #[test]
    fn test_operation_serializes_with_tag() {
        let op = SchemaOperation::DropColumn {
            table: "BAR".to_string(),
            column: "A".to_string(),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "drop_column");
        assert_eq!(op.table(), "BAR");
    }
}
