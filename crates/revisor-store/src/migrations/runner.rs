//! Migration runner
//!
//! Applies migrations with checksums and idempotency

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::schema::{revision_table_migration, Migration};
use revisor_core::config::RevisionerConfig;
use rusqlite::{Connection, OptionalExtension};

/// Apply all pending migrations for the configured revision table
///
/// # Errors
///
/// - `InvalidInput` if the configured table name is not a plain identifier
/// - `ConstraintViolation` if the table was created from a different configuration
/// - `Persistence` if the DDL fails
pub fn apply_migrations(conn: &mut Connection, config: &RevisionerConfig) -> Result<()> {
    config.validate()?;

    create_schema_version_table(conn)?;

    let migration = revision_table_migration(config);
    apply_migration(conn, &migration)?;

    Ok(())
}

/// Create the schema_version table if it doesn't exist
fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Apply a single migration if not already applied
fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let checksum = compute_checksum(&migration.sql);

    let recorded: Option<Option<String>> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1",
            [&migration.id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    match recorded {
        Some(Some(existing)) if existing != checksum => {
            return Err(checksum_mismatch(&migration.id, &existing, &checksum));
        }
        Some(_) => {
            // Idempotent: already applied with this configuration
            return Ok(());
        }
        None => {}
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(&migration.sql)
        .map_err(|e| migration_error(&migration.id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![migration.id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id = %migration.id, "Applied revision table migration");

    Ok(())
}
