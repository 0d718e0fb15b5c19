//! Field and model descriptions

use serde::{Deserialize, Serialize};

use crate::utils::naming::table_name_for_model;

/// A type that describes a database table
pub trait Model {
    /// Full description of the model's table
    fn definition() -> ModelDefinition;
}

/// Column storage classes the dialect knows how to declare
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    SmallInt,
    Integer,
    BigInt,
    Boolean,
    Float,
    Double,
    Varchar(u32),
    Text,
    Date,
    Time,
    Timestamp,
    Custom(String),
}

impl FieldType {
    /// Column type as written in DDL
    pub fn sql(&self) -> String {
        match self {
            FieldType::SmallInt => "SMALLINT".to_string(),
            FieldType::Integer => "INTEGER".to_string(),
            FieldType::BigInt => "BIGINT".to_string(),
            // pre-3.0 servers have no BOOLEAN; stored as 0/1
            FieldType::Boolean => "SMALLINT".to_string(),
            FieldType::Float => "FLOAT".to_string(),
            FieldType::Double => "DOUBLE PRECISION".to_string(),
            FieldType::Varchar(length) => format!("VARCHAR({})", length),
            FieldType::Text => "BLOB SUB_TYPE 1".to_string(),
            FieldType::Date => "DATE".to_string(),
            FieldType::Time => "TIME".to_string(),
            FieldType::Timestamp => "TIMESTAMP".to_string(),
            FieldType::Custom(sql) => sql.clone(),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, FieldType::SmallInt | FieldType::Integer | FieldType::BigInt)
    }

    /// Declared character length for bounded text
    pub fn max_length(&self) -> Option<u32> {
        match self {
            FieldType::Varchar(length) => Some(*length),
            _ => None,
        }
    }
}

/// Target of a foreign key field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyTarget {
    pub table: String,
    pub column: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl ForeignKeyTarget {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
            on_delete: None,
            on_update: None,
        }
    }

    pub fn on_delete(mut self, action: &str) -> Self {
        self.on_delete = Some(action.to_string());
        self
    }

    pub fn on_update(mut self, action: &str) -> Self {
        self.on_update = Some(action.to_string());
        self
    }
}

/// A proposed column and the constraints that come with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub db_column: Option<String>,
    pub field_type: FieldType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub db_index: bool,
    pub default: Option<String>,
    pub foreign_key: Option<ForeignKeyTarget>,
}

impl FieldSpec {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            db_column: None,
            field_type,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            unique: false,
            db_index: false,
            default: None,
            foreign_key: None,
        }
    }

    /// Name of the backing column before normalization
    pub fn column_name(&self) -> &str {
        self.db_column.as_deref().unwrap_or(&self.name)
    }

    pub fn db_column(mut self, column: &str) -> Self {
        self.db_column = Some(column.to_string());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark as primary key; integer keys are fed from a sequence
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self.auto_increment = self.field_type.is_integer();
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn db_index(mut self, db_index: bool) -> Self {
        self.db_index = db_index;
        self
    }

    pub fn default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    /// Reference another table. Foreign keys are indexed unless told otherwise.
    pub fn foreign_key(mut self, target: ForeignKeyTarget) -> Self {
        self.foreign_key = Some(target);
        self.db_index = true;
        self
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }
}

/// Everything the schema editor needs to know about one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub table: String,
    pub fields: Vec<FieldSpec>,
    pub indexes: Vec<Vec<String>>,
}

impl ModelDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table_name_for_model(name),
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn add_field(&mut self, field: FieldSpec) {
        self.fields.push(field);
    }

    /// Declare an explicit index over the given field names, in order
    pub fn add_index(&mut self, fields: Vec<String>) {
        self.indexes.push(fields);
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.primary_key)
    }

    pub fn foreign_key_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_foreign_key())
    }

    /// Give the model an auto-increment `id` unless it declares a primary key
    pub fn ensure_primary_key(&mut self) {
        if self.primary_key().is_none() {
            self.fields
                .insert(0, FieldSpec::new("id", FieldType::Integer).primary_key());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_primary_key() {
        let mut model = ModelDefinition::new("Foo");
        model.add_field(FieldSpec::new("name", FieldType::Varchar(50)));
        model.ensure_primary_key();

        let pk = model.primary_key().unwrap();
        assert_eq!(pk.name, "id");
        assert!(pk.auto_increment);
        assert_eq!(model.fields.len(), 2);
        assert_eq!(model.table, "foo");
    }

    #[test]
    fn test_explicit_primary_key_is_kept() {
        let mut model = ModelDefinition::new("Country");
        model.add_field(FieldSpec::new("code", FieldType::Varchar(2)).primary_key());
        model.ensure_primary_key();

        assert_eq!(model.fields.len(), 1);
        assert!(!model.primary_key().unwrap().auto_increment);
    }

    #[test]
    fn test_foreign_key_fields_are_indexed() {
        let field = FieldSpec::new("a", FieldType::Integer).foreign_key(ForeignKeyTarget::new("foo", "id"));
        assert!(field.db_index);
        assert!(field.is_foreign_key());
        assert!(!field.db_index(false).db_index);
    }

    #[test]
    fn test_field_type_sql() {
        assert_eq!(FieldType::Varchar(200).sql(), "VARCHAR(200)");
        assert_eq!(FieldType::Text.sql(), "BLOB SUB_TYPE 1");
        assert_eq!(FieldType::Double.sql(), "DOUBLE PRECISION");
        assert_eq!(FieldType::Varchar(200).max_length(), Some(200));
        assert_eq!(FieldType::Text.max_length(), None);
    }
}
