//! Revision table DDL
//!
//! One polymorphic table serves every tracked type. Its column types are a
//! function of the configuration, so the DDL is generated rather than
//! embedded.

use revisor_core::codec::BodyStorage;
use revisor_core::config::RevisionerConfig;
use revisor_core::model::{InstanceIdType, PrimaryKeyStrategy};

/// Migration metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: String,
    pub sql: String,
}

/// Build the migration creating the configured revision table
///
/// The caller validates `config.table_name` before the name is interpolated.
pub fn revision_table_migration(config: &RevisionerConfig) -> Migration {
    let table = &config.table_name;

    let id_column = match config.primary_key {
        PrimaryKeyStrategy::Integer => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        PrimaryKeyStrategy::Token => "id TEXT PRIMARY KEY NOT NULL CHECK (length(id) > 0)",
    };

    let instance_id_column = match config.instance_id_type {
        InstanceIdType::Integer => {
            "instance_id INTEGER NOT NULL CHECK (typeof(instance_id) = 'integer')"
        }
        InstanceIdType::Token => "instance_id TEXT NOT NULL CHECK (typeof(instance_id) = 'text')",
    };

    // SQLite has no separate JSON storage class; native bodies are JSON text
    // that the engine itself validates.
    let body_column = match config.body_storage {
        BodyStorage::Native => "body TEXT NOT NULL DEFAULT '{}' CHECK (json_valid(body))",
        BodyStorage::Serialized => "body TEXT NOT NULL DEFAULT '{}'",
    };

    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            {id_column},
            instance_type TEXT NOT NULL CHECK (length(instance_type) > 0),
            {instance_id_column},
            {body_column},
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS {table}_instance_idx
            ON {table} (instance_type, instance_id, created_at);
        CREATE INDEX IF NOT EXISTS {table}_created_at_idx
            ON {table} (created_at);"
    );

    Migration {
        id: format!("001_revision_table:{}", table),
        sql,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_serialized_ddl() {
        let migration = revision_table_migration(&RevisionerConfig::default());
        assert_eq!(migration.id, "001_revision_table:revisions");
        assert!(migration.sql.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(migration.sql.contains("instance_id INTEGER NOT NULL"));
        assert!(!migration.sql.contains("json_valid"));
    }

    #[test]
    fn test_token_native_ddl() {
        let config = RevisionerConfig::default()
            .with_table_name("audit_trail")
            .with_primary_key(PrimaryKeyStrategy::Token)
            .with_instance_id_type(InstanceIdType::Token)
            .with_body_storage(BodyStorage::Native);
        let migration = revision_table_migration(&config);
        assert_eq!(migration.id, "001_revision_table:audit_trail");
        assert!(migration.sql.contains("CREATE TABLE IF NOT EXISTS audit_trail"));
        assert!(migration.sql.contains("id TEXT PRIMARY KEY"));
        assert!(migration.sql.contains("instance_id TEXT NOT NULL"));
        assert!(migration.sql.contains("json_valid(body)"));
    }
}
