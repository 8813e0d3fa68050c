// Integration tests for the configuration-derived revision schema

use revisor_core::codec::BodyStorage;
use revisor_core::config::RevisionerConfig;
use revisor_core::errors::ExErrorKind;
use revisor_core::model::{InstanceIdType, PrimaryKeyStrategy};
use revisor_store::migrations::apply_migrations;
use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: The default configuration is migrated
    let result = apply_migrations(&mut conn, &RevisionerConfig::default());
    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());

    // Then: The revision table, the version table and AUTOINCREMENT's sequence exist
    let tables = get_table_names(&conn);
    for expected in ["revisions", "schema_version", "sqlite_sequence"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_token_table_has_no_sequence() {
    let mut conn = setup_test_db();
    let config = RevisionerConfig::default().with_primary_key(PrimaryKeyStrategy::Token);

    apply_migrations(&mut conn, &config).unwrap();

    let tables = get_table_names(&conn);
    assert!(tables.contains(&"revisions".to_string()));
    assert!(!tables.contains(&"sqlite_sequence".to_string()));
}

#[test]
fn test_migration_idempotency() {
    // Given: A database with the revision table already created
    let mut conn = setup_test_db();
    let config = RevisionerConfig::default();
    apply_migrations(&mut conn, &config).unwrap();

    // When: The same configuration is migrated again
    let result = apply_migrations(&mut conn, &config);

    // Then: Nothing changes
    assert!(result.is_ok());
    let version_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version_count, 1);
}

#[test]
fn test_storage_strategy_is_fixed_at_construction() {
    // Given: A serialized-body table
    let mut conn = setup_test_db();
    apply_migrations(&mut conn, &RevisionerConfig::default()).unwrap();

    // When: The same table is migrated with native storage
    let native = RevisionerConfig::default().with_body_storage(BodyStorage::Native);
    let err = apply_migrations(&mut conn, &native).unwrap_err();

    // Then: The checksum mismatch is a constraint violation
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    assert_eq!(err.op(), Some("migration_checksum"));
}

#[test]
fn test_instance_id_column_type_is_enforced() {
    // Given: A table configured for integer instance ids
    let mut conn = setup_test_db();
    apply_migrations(&mut conn, &RevisionerConfig::default()).unwrap();

    // When: A text instance id bypasses the store
    let result = conn.execute(
        "INSERT INTO revisions (instance_type, instance_id, body, created_at)
         VALUES ('Post', 'abc', '{}', 0)",
        [],
    );

    // Then: The CHECK constraint rejects it
    assert!(result.is_err());
}

#[test]
fn test_native_body_column_rejects_malformed_json() {
    let mut conn = setup_test_db();
    let config = RevisionerConfig::default()
        .with_instance_id_type(InstanceIdType::Token)
        .with_body_storage(BodyStorage::Native);
    apply_migrations(&mut conn, &config).unwrap();

    let result = conn.execute(
        "INSERT INTO revisions (instance_type, instance_id, body, created_at)
         VALUES ('Post', 'p-1', '{\"title\":', 0)",
        [],
    );
    assert!(result.is_err());
}
