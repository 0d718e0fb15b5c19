//! Schema introspection
//!
//! The dialect never talks to the database itself. An [`Introspector`] hands
//! it a point-in-time snapshot; the executing layer is responsible for keeping
//! that snapshot consistent while a diff is computed.
//!
//! For a live Firebird connection the executor runs the catalog queries below
//! and feeds the rows to [`CatalogRows::into_schema`].

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::types::{Column, DatabaseSchema, ForeignKey, Index, PrimaryKey, Table};

/// Source of schema metadata
#[async_trait]
pub trait Introspector: Send + Sync {
    /// Names of the user tables
    async fn table_names(&self) -> Result<Vec<String>>;

    /// Columns, keys and indexes of one table
    async fn describe_table(&self, table: &str) -> Result<Table>;

    /// Snapshot of every user table
    async fn snapshot(&self) -> Result<DatabaseSchema> {
        let mut schema = DatabaseSchema::new();
        for name in self.table_names().await? {
            schema.add_table(self.describe_table(&name).await?);
        }
        Ok(schema)
    }
}

/// Introspector over an already captured snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotIntrospector {
    schema: DatabaseSchema,
}

impl SnapshotIntrospector {
    pub fn new(schema: DatabaseSchema) -> Self {
        Self { schema }
    }
}

#[async_trait]
impl Introspector for SnapshotIntrospector {
    async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.schema.tables.keys().cloned().collect())
    }

    async fn describe_table(&self, table: &str) -> Result<Table> {
        self.schema
            .table(table)
            .cloned()
            .ok_or_else(|| Error::DatabaseError(format!("Table {} does not exist", table)))
    }

    async fn snapshot(&self) -> Result<DatabaseSchema> {
        Ok(self.schema.clone())
    }
}

/// Columns of user tables, in declaration order
pub const COLUMNS_QUERY: &str = "\
SELECT TRIM(rf.RDB$RELATION_NAME) AS table_name, TRIM(rf.RDB$FIELD_NAME) AS column_name, \
f.RDB$FIELD_TYPE AS field_type, f.RDB$FIELD_SUB_TYPE AS field_sub_type, \
f.RDB$CHARACTER_LENGTH AS char_length, f.RDB$FIELD_PRECISION AS field_precision, \
f.RDB$FIELD_SCALE AS field_scale, rf.RDB$NULL_FLAG AS null_flag, \
CAST(rf.RDB$DEFAULT_SOURCE AS VARCHAR(255)) AS default_source \
FROM RDB$RELATION_FIELDS rf \
JOIN RDB$FIELDS f ON f.RDB$FIELD_NAME = rf.RDB$FIELD_SOURCE \
JOIN RDB$RELATIONS r ON r.RDB$RELATION_NAME = rf.RDB$RELATION_NAME \
WHERE COALESCE(r.RDB$SYSTEM_FLAG, 0) = 0 AND r.RDB$VIEW_BLR IS NULL \
ORDER BY rf.RDB$RELATION_NAME, rf.RDB$FIELD_POSITION";

/// Index segments with the constraint (if any) each index backs
pub const INDEXES_QUERY: &str = "\
SELECT TRIM(i.RDB$RELATION_NAME) AS table_name, TRIM(i.RDB$INDEX_NAME) AS index_name, \
TRIM(s.RDB$FIELD_NAME) AS column_name, s.RDB$FIELD_POSITION AS position, \
i.RDB$UNIQUE_FLAG AS unique_flag, TRIM(rc.RDB$CONSTRAINT_TYPE) AS constraint_type \
FROM RDB$INDICES i \
JOIN RDB$INDEX_SEGMENTS s ON s.RDB$INDEX_NAME = i.RDB$INDEX_NAME \
LEFT JOIN RDB$RELATION_CONSTRAINTS rc ON rc.RDB$INDEX_NAME = i.RDB$INDEX_NAME \
WHERE COALESCE(i.RDB$SYSTEM_FLAG, 0) = 0 \
ORDER BY i.RDB$RELATION_NAME, i.RDB$INDEX_NAME, s.RDB$FIELD_POSITION";

/// Primary key and foreign key segments
pub const CONSTRAINTS_QUERY: &str = "\
SELECT TRIM(rc.RDB$RELATION_NAME) AS table_name, TRIM(rc.RDB$CONSTRAINT_NAME) AS constraint_name, \
TRIM(rc.RDB$CONSTRAINT_TYPE) AS constraint_type, TRIM(s.RDB$FIELD_NAME) AS column_name, \
s.RDB$FIELD_POSITION AS position, TRIM(ri.RDB$RELATION_NAME) AS ref_table, \
TRIM(rs.RDB$FIELD_NAME) AS ref_column, TRIM(refc.RDB$DELETE_RULE) AS delete_rule, \
TRIM(refc.RDB$UPDATE_RULE) AS update_rule \
FROM RDB$RELATION_CONSTRAINTS rc \
JOIN RDB$INDEX_SEGMENTS s ON s.RDB$INDEX_NAME = rc.RDB$INDEX_NAME \
LEFT JOIN RDB$REF_CONSTRAINTS refc ON refc.RDB$CONSTRAINT_NAME = rc.RDB$CONSTRAINT_NAME \
LEFT JOIN RDB$RELATION_CONSTRAINTS uq ON uq.RDB$CONSTRAINT_NAME = refc.RDB$CONST_NAME_UQ \
LEFT JOIN RDB$INDICES ri ON ri.RDB$INDEX_NAME = uq.RDB$INDEX_NAME \
LEFT JOIN RDB$INDEX_SEGMENTS rs ON rs.RDB$INDEX_NAME = uq.RDB$INDEX_NAME \
AND rs.RDB$FIELD_POSITION = s.RDB$FIELD_POSITION \
WHERE rc.RDB$CONSTRAINT_TYPE IN ('PRIMARY KEY', 'FOREIGN KEY') \
ORDER BY rc.RDB$RELATION_NAME, rc.RDB$CONSTRAINT_NAME, s.RDB$FIELD_POSITION";

/// Row of [`COLUMNS_QUERY`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRow {
    pub table_name: String,
    pub column_name: String,
    pub field_type: i16,
    pub field_sub_type: Option<i16>,
    pub char_length: Option<i32>,
    pub field_precision: Option<i16>,
    pub field_scale: Option<i16>,
    pub null_flag: Option<i16>,
    pub default_source: Option<String>,
}

/// Row of [`INDEXES_QUERY`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRow {
    pub table_name: String,
    pub index_name: String,
    pub column_name: String,
    pub position: i16,
    pub unique_flag: Option<i16>,
    pub constraint_type: Option<String>,
}

/// Row of [`CONSTRAINTS_QUERY`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintRow {
    pub table_name: String,
    pub constraint_name: String,
    pub constraint_type: String,
    pub column_name: String,
    pub position: i16,
    pub ref_table: Option<String>,
    pub ref_column: Option<String>,
    pub delete_rule: Option<String>,
    pub update_rule: Option<String>,
}

/// Result sets of the three catalog queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogRows {
    pub columns: Vec<ColumnRow>,
    pub indexes: Vec<IndexRow>,
    pub constraints: Vec<ConstraintRow>,
}

impl CatalogRows {
    /// Assemble a snapshot from catalog rows.
    ///
    /// Indexes backing primary keys and unique constraints belong to those
    /// constraints and are left out. Indexes backing foreign keys are kept:
    /// they exist in the database and the auto-index policy recognizes them.
    pub fn into_schema(self) -> Result<DatabaseSchema> {
        let mut tables: IndexMap<String, Table> = IndexMap::new();

        for row in self.columns {
            let data_type = firebird_type_name(&row)?;
            let mut column = Column::new(&row.column_name, &data_type)
                .nullable(row.null_flag.unwrap_or(0) == 0);
            column.default = row
                .default_source
                .as_deref()
                .map(strip_default_keyword)
                .filter(|d| !d.is_empty());

            tables
                .entry(row.table_name.clone())
                .or_insert_with(|| Table::new(&row.table_name))
                .add_column(column);
        }

        let mut constraints = self.constraints;
        constraints.sort_by_key(|r| r.position);
        for row in constraints {
            let table = tables.get_mut(&row.table_name).ok_or_else(|| {
                Error::DatabaseError(format!(
                    "Constraint {} refers to unknown table {}",
                    row.constraint_name, row.table_name
                ))
            })?;

            match row.constraint_type.as_str() {
                "PRIMARY KEY" => {
                    let pk = table.primary_key.get_or_insert_with(|| PrimaryKey {
                        name: Some(row.constraint_name.clone()),
                        columns: Vec::new(),
                    });
                    pk.columns.push(row.column_name);
                }
                "FOREIGN KEY" => {
                    let ref_table = row.ref_table.clone().unwrap_or_default();
                    let ref_column = row.ref_column.clone().unwrap_or_default();
                    match table
                        .foreign_keys
                        .iter_mut()
                        .find(|fk| fk.name == row.constraint_name)
                    {
                        Some(fk) => {
                            fk.columns.push(row.column_name);
                            fk.ref_columns.push(ref_column);
                        }
                        None => table.add_foreign_key(ForeignKey {
                            name: row.constraint_name,
                            columns: vec![row.column_name],
                            ref_table,
                            ref_columns: vec![ref_column],
                            on_delete: row.delete_rule.filter(|r| r != "RESTRICT"),
                            on_update: row.update_rule.filter(|r| r != "RESTRICT"),
                        }),
                    }
                }
                other => {
                    tracing::trace!(constraint_type = other, "Ignoring constraint type");
                }
            }
        }

        let mut indexes = self.indexes;
        indexes.sort_by_key(|r| r.position);
        for row in indexes {
            if matches!(
                row.constraint_type.as_deref(),
                Some("PRIMARY KEY") | Some("UNIQUE")
            ) {
                continue;
            }

            let Some(table) = tables.get_mut(&row.table_name) else {
                continue;
            };

            match table.indexes.iter_mut().find(|i| i.name == row.index_name) {
                Some(index) => index.columns.push(row.column_name),
                None => table.add_index(
                    Index::new(&row.index_name, vec![row.column_name])
                        .unique(row.unique_flag.unwrap_or(0) == 1),
                ),
            }
        }

        let mut schema = DatabaseSchema::new();
        for (_, table) in tables {
            schema.add_table(table);
        }
        Ok(schema)
    }
}

/// DDL type name for a catalog column
fn firebird_type_name(row: &ColumnRow) -> Result<String> {
    let scale = row.field_scale.unwrap_or(0);
    let sub_type = row.field_sub_type.unwrap_or(0);

    let exact_numeric = |base: &str| {
        if scale < 0 && sub_type != 0 {
            let kind = if sub_type == 2 { "DECIMAL" } else { "NUMERIC" };
            format!("{}({}, {})", kind, row.field_precision.unwrap_or(18), -scale)
        } else {
            base.to_string()
        }
    };

    let name = match row.field_type {
        7 => exact_numeric("SMALLINT"),
        8 => exact_numeric("INTEGER"),
        16 => exact_numeric("BIGINT"),
        10 => "FLOAT".to_string(),
        27 => "DOUBLE PRECISION".to_string(),
        12 => "DATE".to_string(),
        13 => "TIME".to_string(),
        35 => "TIMESTAMP".to_string(),
        23 => "BOOLEAN".to_string(),
        14 => format!("CHAR({})", row.char_length.unwrap_or(1)),
        37 => format!("VARCHAR({})", row.char_length.unwrap_or(1)),
        261 => format!("BLOB SUB_TYPE {}", sub_type),
        other => {
            return Err(Error::DatabaseError(format!(
                "Unknown field type {} for {}.{}",
                other, row.table_name, row.column_name
            )))
        }
    };

    Ok(name)
}

/// `RDB$DEFAULT_SOURCE` holds the clause text, e.g. `DEFAULT 0`
fn strip_default_keyword(source: &str) -> String {
    let trimmed = source.trim();
    match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("DEFAULT") => trimmed[7..].trim().to_string(),
        _ => trimmed.to_string(),
    }
}
