//! Schema editor
//!
//! Turns requested model changes into ordered [`SchemaOperation`] lists. Every
//! decision is a pure function of the request and the snapshot the editor was
//! built with; nothing is executed here.
//!
//! The generic layer pairs each foreign key with an index. Firebird builds
//! that index itself when the constraint is created, so index candidates are
//! always filtered through [`AutoIndexPolicy`].

use crate::config::{Config, NamingConfig};
use crate::error::{Error, Result};
use crate::models::definition::{FieldSpec, ModelDefinition};
use crate::ops::sequence::SequenceNamer;
use crate::schema::auto_index::AutoIndexPolicy;
use crate::schema::generator::MigrationGenerator;
use crate::schema::introspector::Introspector;
use crate::schema::types::{Column, DatabaseSchema, ForeignKey, Index, PrimaryKey, SchemaOperation, Table};
use crate::utils::naming::{get_foreign_key_name, get_index_name, IdentifierPolicy};

/// Computes schema operations against one snapshot
#[derive(Debug, Clone)]
pub struct SchemaEditor {
    snapshot: DatabaseSchema,
    policy: IdentifierPolicy,
    naming: NamingConfig,
    sequences: SequenceNamer,
    auto_index: AutoIndexPolicy,
    generator: MigrationGenerator,
}

impl SchemaEditor {
    pub fn new(snapshot: DatabaseSchema, config: &Config) -> Self {
        let policy = IdentifierPolicy::from_config(&config.dialect);
        Self {
            snapshot,
            policy,
            naming: config.naming.clone(),
            sequences: SequenceNamer::new(policy, &config.dialect),
            auto_index: AutoIndexPolicy::new(),
            generator: MigrationGenerator::new(policy),
        }
    }

    /// Build an editor from a freshly read snapshot
    pub async fn introspect(introspector: &dyn Introspector, config: &Config) -> Result<Self> {
        let snapshot = introspector.snapshot().await?;
        Ok(Self::new(snapshot, config))
    }

    pub fn snapshot(&self) -> &DatabaseSchema {
        &self.snapshot
    }

    pub fn generator(&self) -> &MigrationGenerator {
        &self.generator
    }

    /// Operations to add `field` to `model`'s table.
    ///
    /// Emits the column, then its foreign key, then only the indexes the
    /// engine will not create by itself.
    pub fn add_field(&self, model: &ModelDefinition, field: &FieldSpec) -> Result<Vec<SchemaOperation>> {
        let table_name = self.table_name(model)?;
        let table = self.snapshot_table(&table_name)?;
        let column = self.column_for(field)?;

        if table.has_column(&column.name) {
            return Err(Error::SchemaConflict(format!(
                "Column {}.{} already exists",
                table_name, column.name
            )));
        }

        let mut operations = vec![SchemaOperation::AddColumn {
            table: table_name.clone(),
            column,
        }];

        if let Some(fk) = self.foreign_key_for(&table_name, field)? {
            operations.push(SchemaOperation::AddForeignKey {
                table: table_name.clone(),
                foreign_key: fk,
            });
        }

        for index in self.field_indexes(model, field)? {
            operations.push(SchemaOperation::CreateIndex {
                table: table_name.clone(),
                index,
            });
        }

        Ok(operations)
    }

    /// Operations to remove `field_name` from `model`'s table.
    ///
    /// The column must still be present in the snapshot; a missing table or
    /// column is reported as a conflict rather than skipped.
    pub fn remove_field(&self, model: &ModelDefinition, field_name: &str) -> Result<Vec<SchemaOperation>> {
        let field = model.field(field_name).ok_or_else(|| {
            Error::SchemaConflict(format!("Model {} has no field {}", model.name, field_name))
        })?;
        let table_name = self.table_name(model)?;
        let table = self.snapshot_table(&table_name)?;
        let column = self.policy.normalize(field.column_name())?.into_string();

        if !table.has_column(&column) {
            return Err(Error::SchemaConflict(format!(
                "Column {}.{} does not exist",
                table_name, column
            )));
        }

        let mut operations: Vec<SchemaOperation> = table
            .foreign_keys_on(&column)
            .map(|fk| SchemaOperation::DropForeignKey {
                table: table_name.clone(),
                name: fk.name.clone(),
            })
            .collect();

        // indexes backing the dropped constraints go away with them
        for index in table.indexes.iter().filter(|i| i.covers(&column)) {
            if self.auto_index.is_auto_created_on(table, index) {
                continue;
            }
            operations.push(SchemaOperation::DropIndex {
                table: table_name.clone(),
                name: index.name.clone(),
            });
        }

        operations.push(SchemaOperation::DropColumn {
            table: table_name,
            column,
        });

        Ok(operations)
    }

    /// Add one foreign key constraint. Never paired with an index.
    pub fn add_foreign_key(&self, table: &str, foreign_key: ForeignKey) -> Result<Vec<SchemaOperation>> {
        let table_name = self.policy.normalize(table)?.into_string();
        let current = self.snapshot_table(&table_name)?;
        let foreign_key = self.normalize_foreign_key(foreign_key)?;

        if current.foreign_keys.iter().any(|fk| fk.name == foreign_key.name) {
            return Err(Error::SchemaConflict(format!(
                "Constraint {} already exists on {}",
                foreign_key.name, table_name
            )));
        }
        if let Some(missing) = foreign_key.columns.iter().find(|c| !current.has_column(c)) {
            return Err(Error::SchemaConflict(format!(
                "Column {}.{} does not exist",
                table_name, missing
            )));
        }

        Ok(vec![SchemaOperation::AddForeignKey {
            table: table_name,
            foreign_key,
        }])
    }

    /// Drop one foreign key constraint; its implicit index goes with it
    pub fn drop_foreign_key(&self, table: &str, name: &str) -> Result<Vec<SchemaOperation>> {
        let table_name = self.policy.normalize(table)?.into_string();
        let name = self.policy.normalize(name)?.into_string();
        let current = self.snapshot_table(&table_name)?;

        if !current.foreign_keys.iter().any(|fk| fk.name == name) {
            return Err(Error::SchemaConflict(format!(
                "Constraint {} does not exist on {}",
                name, table_name
            )));
        }

        Ok(vec![SchemaOperation::DropForeignKey {
            table: table_name,
            name,
        }])
    }

    /// Indexes of one field that still need an explicit CREATE INDEX
    pub fn field_indexes(&self, model: &ModelDefinition, field: &FieldSpec) -> Result<Vec<Index>> {
        let table_name = self.table_name(model)?;
        let candidates = self.field_index_candidates(&table_name, field)?;

        let mut foreign_keys = self.known_foreign_keys(&table_name, model)?;
        if let Some(fk) = self.foreign_key_for(&table_name, field)? {
            foreign_keys.push(fk);
        }

        Ok(self
            .auto_index
            .retain_explicit(&table_name, candidates, &foreign_keys))
    }

    /// Indexes of a whole model that still need an explicit CREATE INDEX
    pub fn model_indexes(&self, model: &ModelDefinition) -> Result<Vec<Index>> {
        let table_name = self.table_name(model)?;
        let mut candidates = Vec::new();

        for field in &model.fields {
            candidates.extend(self.field_index_candidates(&table_name, field)?);
        }

        for fields in &model.indexes {
            let columns = fields
                .iter()
                .map(|name| {
                    let column = model.field(name).map_or(name.as_str(), |f| f.column_name());
                    self.policy.normalize(column).map(|c| c.into_string())
                })
                .collect::<Result<Vec<_>>>()?;
            candidates.push(self.index_for(&table_name, columns)?);
        }

        // a db_index field also listed as an explicit index yields one index
        let mut unique_candidates: Vec<Index> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !unique_candidates.iter().any(|kept| kept.is_equivalent(&candidate)) {
                unique_candidates.push(candidate);
            }
        }

        let foreign_keys = self.known_foreign_keys(&table_name, model)?;
        Ok(self
            .auto_index
            .retain_explicit(&table_name, unique_candidates, &foreign_keys))
    }

    /// CREATE INDEX statements for a model. Empty when every candidate is
    /// covered by a foreign key.
    pub fn model_indexes_sql(&self, model: &ModelDefinition) -> Result<Vec<String>> {
        let table_name = self.table_name(model)?;
        self.model_indexes(model)?
            .iter()
            .map(|index| self.generator.generate_create_index_sql(&table_name, index))
            .collect()
    }

    /// Table the engine holds right after the model is created, implicit
    /// foreign key indexes included
    pub fn table_for_model(&self, model: &ModelDefinition) -> Result<Table> {
        let table_name = self.table_name(model)?;
        let mut table = Table::new(&table_name);

        for field in &model.fields {
            table.add_column(self.column_for(field)?);
        }

        if let Some(pk) = self.primary_key_for(model)? {
            table.set_primary_key(pk);
        }

        for fk in self.model_foreign_keys(&table_name, model)? {
            // the engine names a constraint's index after the constraint
            table.add_index(Index::new(&fk.name, fk.columns.clone()));
            table.add_foreign_key(fk);
        }

        for index in self.model_indexes(model)? {
            table.add_index(index);
        }

        Ok(table)
    }

    /// Statements creating a model: table, identity sequence and trigger,
    /// foreign keys, then explicit indexes
    pub fn create_model_sql(&self, model: &ModelDefinition) -> Result<Vec<String>> {
        let table_name = self.table_name(model)?;
        let mut table = Table::new(&table_name);
        for field in &model.fields {
            table.add_column(self.column_for(field)?);
        }
        table.primary_key = self.primary_key_for(model)?;

        let mut statements = vec![self.generator.generate_create_table_sql(&table)?];

        if let Some(pk) = model.primary_key().filter(|pk| pk.auto_increment) {
            statements.push(self.sequences.create_sequence_sql(&table_name)?);
            statements.push(
                self.sequences
                    .autoinc_trigger_sql(&table_name, pk.column_name())?,
            );
        }

        for fk in self.model_foreign_keys(&table_name, model)? {
            statements.push(self.generator.generate_add_foreign_key_sql(&table_name, &fk)?);
        }

        statements.extend(self.model_indexes_sql(model)?);
        Ok(statements)
    }

    /// Statements dropping a model and its identity sequence
    pub fn delete_model_sql(&self, model: &ModelDefinition) -> Result<Vec<String>> {
        let table_name = self.table_name(model)?;
        let mut statements = vec![self.generator.generate_drop_table_sql(&table_name)?];

        if model.primary_key().is_some_and(|pk| pk.auto_increment) {
            statements.push(self.sequences.drop_sequence_sql(&table_name)?);
        }

        Ok(statements)
    }

    /// Render operations as DDL
    pub fn render(&self, operations: &[SchemaOperation]) -> Result<Vec<String>> {
        self.generator.generate_migration_sql(operations)
    }

    fn table_name(&self, model: &ModelDefinition) -> Result<String> {
        Ok(self.policy.normalize(&model.table)?.into_string())
    }

    fn snapshot_table(&self, table_name: &str) -> Result<&Table> {
        self.snapshot
            .table(table_name)
            .ok_or_else(|| Error::SchemaConflict(format!("Table {} does not exist", table_name)))
    }

    fn primary_key_for(&self, model: &ModelDefinition) -> Result<Option<PrimaryKey>> {
        let columns = model
            .fields
            .iter()
            .filter(|f| f.primary_key)
            .map(|f| self.policy.normalize(f.column_name()).map(|c| c.into_string()))
            .collect::<Result<Vec<_>>>()?;

        Ok((!columns.is_empty()).then(|| PrimaryKey { name: None, columns }))
    }

    fn column_for(&self, field: &FieldSpec) -> Result<Column> {
        let name = self.policy.normalize(field.column_name())?;
        let mut column = Column::new(name.as_str(), &field.field_type.sql())
            .nullable(field.nullable && !field.primary_key)
            .unique(field.unique && !field.primary_key);
        column.default = field.default.clone();
        Ok(column)
    }

    fn foreign_key_for(&self, table_name: &str, field: &FieldSpec) -> Result<Option<ForeignKey>> {
        let Some(target) = &field.foreign_key else {
            return Ok(None);
        };

        let column = self.policy.normalize(field.column_name())?.into_string();
        let raw_name = get_foreign_key_name(&self.naming.foreign_key_pattern, table_name, &column);

        Ok(Some(ForeignKey {
            name: self.policy.normalize(&raw_name)?.into_string(),
            columns: vec![column],
            ref_table: self.policy.normalize(&target.table)?.into_string(),
            ref_columns: vec![self.policy.normalize(&target.column)?.into_string()],
            on_delete: target.on_delete.clone(),
            on_update: target.on_update.clone(),
        }))
    }

    fn normalize_foreign_key(&self, foreign_key: ForeignKey) -> Result<ForeignKey> {
        let normalize_all = |names: &[String]| {
            names
                .iter()
                .map(|name| self.policy.normalize(name).map(|n| n.into_string()))
                .collect::<Result<Vec<_>>>()
        };

        Ok(ForeignKey {
            name: self.policy.normalize(&foreign_key.name)?.into_string(),
            columns: normalize_all(&foreign_key.columns)?,
            ref_table: self.policy.normalize(&foreign_key.ref_table)?.into_string(),
            ref_columns: normalize_all(&foreign_key.ref_columns)?,
            on_delete: foreign_key.on_delete,
            on_update: foreign_key.on_update,
        })
    }

    fn model_foreign_keys(&self, table_name: &str, model: &ModelDefinition) -> Result<Vec<ForeignKey>> {
        let mut foreign_keys = Vec::new();
        for field in model.foreign_key_fields() {
            if let Some(fk) = self.foreign_key_for(table_name, field)? {
                foreign_keys.push(fk);
            }
        }
        Ok(foreign_keys)
    }

    /// Foreign keys declared by the model plus those already in the database
    fn known_foreign_keys(&self, table_name: &str, model: &ModelDefinition) -> Result<Vec<ForeignKey>> {
        let mut foreign_keys = self.model_foreign_keys(table_name, model)?;
        if let Some(table) = self.snapshot.table(table_name) {
            foreign_keys.extend(table.foreign_keys.iter().cloned());
        }
        Ok(foreign_keys)
    }

    /// Index the generic layer would propose for a single field
    fn field_index_candidates(&self, table_name: &str, field: &FieldSpec) -> Result<Vec<Index>> {
        // unique columns and keys already carry their constraint's index
        if !field.db_index || field.unique || field.primary_key {
            return Ok(Vec::new());
        }

        let column = self.policy.normalize(field.column_name())?.into_string();
        Ok(vec![self.index_for(table_name, vec![column])?])
    }

    fn index_for(&self, table_name: &str, columns: Vec<String>) -> Result<Index> {
        let raw_name = get_index_name(&self.naming.index_pattern, table_name, &columns);
        Ok(Index::new(self.policy.normalize(&raw_name)?.as_str(), columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::definition::{FieldType, ForeignKeyTarget};
    use pretty_assertions::assert_eq;

    fn foo() -> ModelDefinition {
        let mut model = ModelDefinition::new("Foo");
        model.add_field(FieldSpec::new("name", FieldType::Varchar(50)));
        model.ensure_primary_key();
        model
    }

    fn editor_with(models: &[&ModelDefinition]) -> SchemaEditor {
        let config = Config::default();
        let empty = SchemaEditor::new(DatabaseSchema::new(), &config);
        let mut schema = DatabaseSchema::new();
        for model in models {
            schema.add_table(empty.table_for_model(model).unwrap());
        }
        SchemaEditor::new(schema, &config)
    }

    #[test]
    fn test_plain_indexed_field_gets_index() {
        let mut model = foo();
        model.add_field(FieldSpec::new("code", FieldType::Varchar(10)).db_index(true));
        let editor = editor_with(&[]);

        assert_eq!(
            editor.model_indexes_sql(&model).unwrap(),
            vec!["CREATE INDEX \"FOO_CODE_IDX\" ON \"FOO\" (\"CODE\")".to_string()]
        );
    }

    #[test]
    fn test_unindexed_foreign_key_field_emits_no_index() {
        let model = foo();
        let editor = editor_with(&[&model]);
        let field = FieldSpec::new("parent", FieldType::Integer)
            .nullable(true)
            .foreign_key(ForeignKeyTarget::new("foo", "id"))
            .db_index(false);

        let ops = editor.add_field(&model, &field).unwrap();
        assert_eq!(ops.len(), 2);
        assert!(!ops.iter().any(SchemaOperation::is_index_creation));
    }

    #[test]
    fn test_add_existing_column_conflicts() {
        let model = foo();
        let editor = editor_with(&[&model]);
        let field = FieldSpec::new("name", FieldType::Varchar(50));

        assert!(matches!(editor.add_field(&model, &field), Err(Error::SchemaConflict(_))));
    }

    #[test]
    fn test_remove_field_drops_explicit_index_first() {
        let mut model = foo();
        model.add_field(FieldSpec::new("code", FieldType::Varchar(10)).db_index(true));
        let editor = editor_with(&[&model]);

        let ops = editor.remove_field(&model, "code").unwrap();
        assert_eq!(
            ops,
            vec![
                SchemaOperation::DropIndex {
                    table: "FOO".to_string(),
                    name: "FOO_CODE_IDX".to_string(),
                },
                SchemaOperation::DropColumn {
                    table: "FOO".to_string(),
                    column: "CODE".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_drop_unknown_foreign_key_conflicts() {
        let model = foo();
        let editor = editor_with(&[&model]);
        assert!(matches!(
            editor.drop_foreign_key("foo", "FOO_X_FK"),
            Err(Error::SchemaConflict(_))
        ));
    }

    #[test]
    fn test_add_foreign_key_requires_column() {
        let model = foo();
        let editor = editor_with(&[&model]);
        let fk = ForeignKey {
            name: "FOO_MISSING_FK".to_string(),
            columns: vec!["MISSING".to_string()],
            ref_table: "FOO".to_string(),
            ref_columns: vec!["ID".to_string()],
            on_delete: None,
            on_update: None,
        };
        assert!(matches!(editor.add_foreign_key("foo", fk), Err(Error::SchemaConflict(_))));
    }

    #[test]
    fn test_delete_model_drops_sequence() {
        let editor = editor_with(&[]);
        assert_eq!(
            editor.delete_model_sql(&foo()).unwrap(),
            vec!["DROP TABLE \"FOO\"".to_string(), "DROP SEQUENCE \"FOO_SQ\"".to_string()]
        );
    }
}
