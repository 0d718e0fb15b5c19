use std::io::Write;

use firebird_dialect::db::cursor::{convert_query, translate_database_error};
use firebird_dialect::{init, parse_firebird_version, Error};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_init_from_file() {
    let file = write_config(
        r#"
[connection]
host = "db.internal"
port = 3050
name = "/srv/app.fdb"
user = "SYSDBA"

[dialect]
sequence_suffix = "_GEN"
"#,
    );

    let backend = init(file.path().to_str().unwrap()).unwrap();
    let params = backend.connection_params().unwrap();
    assert_eq!(params.dsn, "db.internal/3050:/srv/app.fdb");
    assert_eq!(params.user.as_deref(), Some("SYSDBA"));

    assert_eq!(backend.ops().get_sequence_name("test").unwrap(), "\"TEST_GEN\"");
    assert_eq!(backend.ops().sequences().trigger_name("test").unwrap(), "\"TEST_TR\"");
}

#[test]
fn test_init_rejects_invalid_dialect() {
    let file = write_config(
        r#"
[dialect]
max_identifier_length = 8
"#,
    );
    assert!(matches!(init(file.path().to_str().unwrap()), Err(Error::ConfigError(_))));
}

#[test]
fn test_connection_needs_database_name() {
    let file = write_config("[connection]\nhost = \"localhost\"\n");
    let backend = init(file.path().to_str().unwrap()).unwrap();
    assert!(matches!(backend.connection_params(), Err(Error::ConfigError(_))));
}

#[rstest]
#[case("WI-V6.3.5.4926 Firebird 1.5", vec![1, 5])]
#[case("WI-V2.5.9.27139 Firebird 2.5", vec![2, 5])]
#[case("LI-V4.0.2.2816 Firebird 4.0", vec![4, 0])]
fn test_server_versions(#[case] server_version: &str, #[case] expected: Vec<u32>) {
    assert_eq!(parse_firebird_version(server_version).unwrap(), expected);
}

#[rstest]
#[case(-803, true)]
#[case(-625, true)]
#[case(-204, false)]
#[case(-607, false)]
fn test_error_families(#[case] sqlcode: i32, #[case] integrity: bool) {
    let err = translate_database_error(sqlcode, "failed", "ALTER TABLE \"BAR\" DROP \"A\"");
    assert_eq!(matches!(err, Error::IntegrityError(_)), integrity);
    assert!(err.is_database_error());
}

#[test]
fn test_query_conversion() {
    assert_eq!(
        convert_query("UPDATE \"FOO\" SET \"NAME\" = %s WHERE \"ID\" = %s", 2).unwrap(),
        "UPDATE \"FOO\" SET \"NAME\" = ? WHERE \"ID\" = ?"
    );
    assert!(matches!(convert_query("SELECT %s, %s", 1), Err(Error::SyntaxError(_))));
}
