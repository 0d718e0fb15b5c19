//! Model registry
//!
//! Collects model definitions so a whole set of models can be turned into the
//! schema the engine would hold after creating them.

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::definition::{Model, ModelDefinition};
use crate::schema::editor::SchemaEditor;
use crate::schema::types::DatabaseSchema;

/// Registry of model definitions, in registration order
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelDefinition>,
}

impl ModelRegistry {
    /// Create a new model registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model type
    pub fn register<M: Model>(&mut self) -> Result<()> {
        self.register_definition(M::definition())
    }

    /// Register an already built definition
    pub fn register_definition(&mut self, definition: ModelDefinition) -> Result<()> {
        if self.models.contains_key(&definition.name) {
            return Err(Error::ConfigError(format!(
                "Model {} is already registered",
                definition.name
            )));
        }
        self.models.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(name)
    }

    pub fn get_models(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.models.values()
    }

    /// Schema the engine holds once every registered model is created
    pub fn to_database_schema(&self, config: &Config) -> Result<DatabaseSchema> {
        let editor = SchemaEditor::new(DatabaseSchema::new(), config);
        let mut schema = DatabaseSchema::new();

        for model in self.models.values() {
            schema.add_table(editor.table_for_model(model)?);
        }

        Ok(schema)
    }
}
