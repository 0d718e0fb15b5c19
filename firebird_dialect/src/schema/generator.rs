//! Migration generator
//!
//! This module renders schema operations and tables as Firebird DDL. One
//! operation maps to exactly one statement; statements carry no trailing `;`
//! since the driver executes them one at a time.

use crate::error::Result;
use crate::schema::types::{Column, ForeignKey, Index, SchemaOperation, Table};
use crate::utils::naming::IdentifierPolicy;

/// Firebird DDL generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationGenerator {
    policy: IdentifierPolicy,
}

impl MigrationGenerator {
    /// Create a new migration generator
    pub fn new(policy: IdentifierPolicy) -> Self {
        Self { policy }
    }

    /// Render a list of operations, in order
    pub fn generate_migration_sql(&self, operations: &[SchemaOperation]) -> Result<Vec<String>> {
        operations
            .iter()
            .map(|op| self.generate_operation_sql(op))
            .collect()
    }

    /// Render one operation as one statement
    pub fn generate_operation_sql(&self, operation: &SchemaOperation) -> Result<String> {
        match operation {
            SchemaOperation::AddColumn { table, column } => Ok(format!(
                "ALTER TABLE {} ADD {}",
                self.policy.quote(table)?,
                self.column_definition(column)?
            )),
            SchemaOperation::DropColumn { table, column } => Ok(format!(
                "ALTER TABLE {} DROP {}",
                self.policy.quote(table)?,
                self.policy.quote(column)?
            )),
            SchemaOperation::AddForeignKey { table, foreign_key } => {
                self.generate_add_foreign_key_sql(table, foreign_key)
            }
            SchemaOperation::DropForeignKey { table, name } => Ok(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.policy.quote(table)?,
                self.policy.quote(name)?
            )),
            SchemaOperation::CreateIndex { table, index } => {
                self.generate_create_index_sql(table, index)
            }
            SchemaOperation::DropIndex { name, .. } => {
                Ok(format!("DROP INDEX {}", self.policy.quote(name)?))
            }
        }
    }

    /// Generate SQL to create a table, without its foreign keys or indexes
    pub fn generate_create_table_sql(&self, table: &Table) -> Result<String> {
        let mut definitions = table
            .columns
            .iter()
            .map(|column| self.column_definition(column))
            .collect::<Result<Vec<_>>>()?;

        if let Some(pk) = &table.primary_key {
            let columns = self.policy.quote_all(&pk.columns)?;
            match &pk.name {
                Some(name) => definitions.push(format!(
                    "CONSTRAINT {} PRIMARY KEY ({})",
                    self.policy.quote(name)?,
                    columns
                )),
                None => definitions.push(format!("PRIMARY KEY ({})", columns)),
            }
        }

        Ok(format!(
            "CREATE TABLE {} ({})",
            self.policy.quote(&table.name)?,
            definitions.join(", ")
        ))
    }

    /// Generate SQL to drop a table
    pub fn generate_drop_table_sql(&self, table_name: &str) -> Result<String> {
        Ok(format!("DROP TABLE {}", self.policy.quote(table_name)?))
    }

    pub fn generate_add_foreign_key_sql(&self, table_name: &str, fk: &ForeignKey) -> Result<String> {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.policy.quote(table_name)?,
            self.policy.quote(&fk.name)?,
            self.policy.quote_all(&fk.columns)?,
            self.policy.quote(&fk.ref_table)?,
            self.policy.quote_all(&fk.ref_columns)?
        );

        if let Some(action) = &fk.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action.to_uppercase()));
        }
        if let Some(action) = &fk.on_update {
            sql.push_str(&format!(" ON UPDATE {}", action.to_uppercase()));
        }

        Ok(sql)
    }

    pub fn generate_create_index_sql(&self, table_name: &str, index: &Index) -> Result<String> {
        let unique = if index.is_unique { "UNIQUE " } else { "" };

        Ok(format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.policy.quote(&index.name)?,
            self.policy.quote(table_name)?,
            self.policy.quote_all(&index.columns)?
        ))
    }

    /// Column definition as used by CREATE TABLE and ALTER TABLE ... ADD.
    ///
    /// Firebird wants DEFAULT before NOT NULL and has no explicit NULL.
    fn column_definition(&self, column: &Column) -> Result<String> {
        let mut def = format!("{} {}", self.policy.quote(&column.name)?, column.data_type);

        if let Some(default) = &column.default {
            def.push_str(&format!(" DEFAULT {}", default));
        }
        if !column.nullable {
            def.push_str(" NOT NULL");
        }
        if column.is_unique {
            def.push_str(" UNIQUE");
        }

        Ok(def)
    }
}
