use firebird_dialect::schema::types::{ForeignKey, Index};
use firebird_dialect::{
    Config, DatabaseSchema, Error, FieldSpec, FieldType, FirebirdModel, ForeignKeyTarget, Model,
    ModelDefinition, ModelRegistry, SchemaEditor, SchemaOperation, SnapshotIntrospector,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

#[derive(FirebirdModel)]
#[allow(dead_code)]
struct Foo {
    #[firebird(max_length = 50)]
    name: String,
}

#[derive(FirebirdModel)]
#[allow(dead_code)]
struct Bar {
    #[firebird(foreign_key = "foo")]
    a: i32,
    b: Option<i32>,
}

#[derive(FirebirdModel)]
#[firebird(index = "a,b")]
#[allow(dead_code)]
struct Baz {
    #[firebird(foreign_key = "foo", on_delete = "cascade")]
    a: i32,
    b: i32,
}

#[derive(FirebirdModel)]
#[firebird(table = "big_s")]
#[allow(dead_code)]
struct BigS {
    #[firebird(max_length = 200, db_index)]
    s: String,
}

fn registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry.register::<Foo>().unwrap();
    registry.register::<Bar>().unwrap();
    registry.register::<Baz>().unwrap();
    registry.register::<BigS>().unwrap();
    registry
}

/// Editor over the schema right after every test model was created
#[fixture]
fn editor() -> SchemaEditor {
    let config = Config::default();
    let schema = registry().to_database_schema(&config).unwrap();
    SchemaEditor::new(schema, &config)
}

fn new_fk_field() -> FieldSpec {
    FieldSpec::new("c", FieldType::Integer)
        .nullable(true)
        .foreign_key(ForeignKeyTarget::new("foo", "id"))
}

#[rstest]
fn test_foreign_key_only_model_has_no_index_sql(editor: SchemaEditor) {
    assert_eq!(editor.model_indexes_sql(&Bar::definition()).unwrap(), Vec::<String>::new());
}

#[rstest]
fn test_model_indexes_sql_is_idempotent(editor: SchemaEditor) {
    for model in registry().get_models() {
        assert_eq!(
            editor.model_indexes_sql(model).unwrap(),
            editor.model_indexes_sql(model).unwrap()
        );
    }
}

#[rstest]
fn test_composite_index_is_kept(editor: SchemaEditor) {
    assert_eq!(
        editor.model_indexes_sql(&Baz::definition()).unwrap(),
        vec!["CREATE INDEX \"BAZ_A_B_IDX\" ON \"BAZ\" (\"A\", \"B\")".to_string()]
    );
}

#[rstest]
fn test_add_foreign_key_field_skips_index(editor: SchemaEditor) {
    let model = Bar::definition();
    let field = new_fk_field();

    let ops = editor.add_field(&model, &field).unwrap();
    assert!(!ops.iter().any(SchemaOperation::is_index_creation));
    assert_eq!(editor.field_indexes(&model, &field).unwrap(), Vec::<Index>::new());

    assert_eq!(
        editor.render(&ops).unwrap(),
        vec![
            "ALTER TABLE \"BAR\" ADD \"C\" INTEGER".to_string(),
            "ALTER TABLE \"BAR\" ADD CONSTRAINT \"BAR_C_FK\" FOREIGN KEY (\"C\") REFERENCES \"FOO\" (\"ID\")".to_string(),
        ]
    );
}

#[rstest]
fn test_add_plain_indexed_field_keeps_index(editor: SchemaEditor) {
    let model = Bar::definition();
    let field = FieldSpec::new("code", FieldType::Varchar(10))
        .nullable(true)
        .db_index(true);

    let ops = editor.add_field(&model, &field).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(
        ops[1],
        SchemaOperation::CreateIndex {
            table: "BAR".to_string(),
            index: Index::new("BAR_CODE_IDX", vec!["CODE".to_string()]),
        }
    );
}

#[rstest]
fn test_remove_foreign_key_field(editor: SchemaEditor) {
    let ops = editor.remove_field(&Bar::definition(), "a").unwrap();
    assert_eq!(
        ops,
        vec![
            SchemaOperation::DropForeignKey {
                table: "BAR".to_string(),
                name: "BAR_A_FK".to_string(),
            },
            SchemaOperation::DropColumn {
                table: "BAR".to_string(),
                column: "A".to_string(),
            },
        ]
    );
}

#[rstest]
fn test_remove_field_missing_from_stale_snapshot(editor: SchemaEditor) {
    let mut schema = editor.snapshot().clone();
    let bar = schema.tables.get_mut("BAR").unwrap();
    bar.columns.retain(|c| c.name != "A");
    bar.foreign_keys.clear();
    bar.indexes.clear();

    let stale = SchemaEditor::new(schema, &Config::default());
    let err = stale.remove_field(&Bar::definition(), "a").unwrap_err();
    assert!(matches!(err, Error::SchemaConflict(_)));
    assert!(err.is_database_error());
}

#[rstest]
fn test_remove_unknown_field(editor: SchemaEditor) {
    assert!(matches!(
        editor.remove_field(&Bar::definition(), "nope"),
        Err(Error::SchemaConflict(_))
    ));
}

#[rstest]
fn test_add_field_to_missing_table() {
    let editor = SchemaEditor::new(DatabaseSchema::new(), &Config::default());
    assert!(matches!(
        editor.add_field(&Bar::definition(), &new_fk_field()),
        Err(Error::SchemaConflict(_))
    ));
}

#[rstest]
fn test_foreign_key_constraint_round_trip(editor: SchemaEditor) {
    let fk = ForeignKey {
        name: "BAZ_B_FK".to_string(),
        columns: vec!["B".to_string()],
        ref_table: "FOO".to_string(),
        ref_columns: vec!["ID".to_string()],
        on_delete: None,
        on_update: None,
    };

    let ops = editor.add_foreign_key("baz", fk.clone()).unwrap();
    assert_eq!(
        ops,
        vec![SchemaOperation::AddForeignKey {
            table: "BAZ".to_string(),
            foreign_key: fk,
        }]
    );

    assert!(matches!(
        editor.drop_foreign_key("baz", "BAZ_B_FK"),
        Err(Error::SchemaConflict(_))
    ));
    assert_eq!(editor.drop_foreign_key("baz", "baz_a_fk").unwrap().len(), 1);
}

#[rstest]
fn test_foreign_key_names_are_normalized(editor: SchemaEditor) {
    let fk = ForeignKey {
        name: "baz_b_fk".to_string(),
        columns: vec!["b".to_string()],
        ref_table: "foo".to_string(),
        ref_columns: vec!["id".to_string()],
        on_delete: None,
        on_update: None,
    };

    let ops = editor.add_foreign_key("baz", fk).unwrap();
    assert_eq!(
        ops,
        vec![SchemaOperation::AddForeignKey {
            table: "BAZ".to_string(),
            foreign_key: ForeignKey {
                name: "BAZ_B_FK".to_string(),
                columns: vec!["B".to_string()],
                ref_table: "FOO".to_string(),
                ref_columns: vec!["ID".to_string()],
                on_delete: None,
                on_update: None,
            },
        }]
    );
}

#[rstest]
fn test_existing_constraint_name_conflicts_in_any_case(editor: SchemaEditor) {
    let fk = ForeignKey {
        name: "baz_a_fk".to_string(),
        columns: vec!["a".to_string()],
        ref_table: "foo".to_string(),
        ref_columns: vec!["id".to_string()],
        on_delete: None,
        on_update: None,
    };

    assert!(matches!(editor.add_foreign_key("baz", fk), Err(Error::SchemaConflict(_))));
}

#[rstest]
fn test_indexed_field_listed_as_explicit_index_yields_one_index(editor: SchemaEditor) {
    let mut model = ModelDefinition::new("Slug");
    model.add_field(FieldSpec::new("s", FieldType::Varchar(200)).db_index(true));
    model.add_index(vec!["s".to_string()]);
    model.ensure_primary_key();

    assert_eq!(
        editor.model_indexes_sql(&model).unwrap(),
        vec!["CREATE INDEX \"SLUG_S_IDX\" ON \"SLUG\" (\"S\")".to_string()]
    );
}

#[rstest]
fn test_create_model_sql(editor: SchemaEditor) {
    assert_eq!(
        editor.create_model_sql(&Bar::definition()).unwrap(),
        vec![
            "CREATE TABLE \"BAR\" (\"ID\" INTEGER NOT NULL, \"A\" INTEGER NOT NULL, \"B\" INTEGER, PRIMARY KEY (\"ID\"))".to_string(),
            "CREATE SEQUENCE \"BAR_SQ\"".to_string(),
            "CREATE TRIGGER \"BAR_TR\" FOR \"BAR\" ACTIVE BEFORE INSERT POSITION 0 AS BEGIN IF (NEW.\"ID\" IS NULL) THEN NEW.\"ID\" = NEXT VALUE FOR \"BAR_SQ\"; END".to_string(),
            "ALTER TABLE \"BAR\" ADD CONSTRAINT \"BAR_A_FK\" FOREIGN KEY (\"A\") REFERENCES \"FOO\" (\"ID\")".to_string(),
        ]
    );
}

#[rstest]
fn test_bounded_text_keeps_declared_length(editor: SchemaEditor) {
    let model = BigS::definition();
    assert_eq!(model.table, "big_s");
    assert_eq!(model.field("s").unwrap().field_type.max_length(), Some(200));

    let table = editor.snapshot().table("BIG_S").unwrap();
    assert_eq!(table.column("S").unwrap().data_type, "VARCHAR(200)");

    let json = editor.snapshot().to_json().unwrap();
    let restored = DatabaseSchema::from_json(&json).unwrap();
    assert_eq!(restored.table("BIG_S").unwrap().column("S").unwrap().data_type, "VARCHAR(200)");

    assert_eq!(
        editor.model_indexes_sql(&model).unwrap(),
        vec!["CREATE INDEX \"BIG_S_S_IDX\" ON \"BIG_S\" (\"S\")".to_string()]
    );
}

#[rstest]
fn test_duplicate_registration() {
    let mut registry = ModelRegistry::new();
    registry.register::<Foo>().unwrap();
    assert!(matches!(registry.register::<Foo>(), Err(Error::ConfigError(_))));
}

#[tokio::test]
async fn test_editor_from_introspector() {
    let config = Config::default();
    let schema = registry().to_database_schema(&config).unwrap();
    let introspector = SnapshotIntrospector::new(schema);

    let editor = SchemaEditor::introspect(&introspector, &config).await.unwrap();
    assert_eq!(editor.snapshot().tables.len(), 4);
    assert_eq!(editor.model_indexes_sql(&Bar::definition()).unwrap(), Vec::<String>::new());
}
