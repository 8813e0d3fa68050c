//! Error handling for revisor-store
//!
//! Wraps revisor-core ExError with store-specific helpers

use revisor_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
///
/// Raised when a revision table already exists with a schema derived from a
/// different configuration.
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, configured {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
///
/// Constraint failures (NOT NULL, CHECK, PRIMARY KEY, trigger RAISE) are
/// classified as `ConstraintViolation`; everything else is `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_constraint_failure_is_classified() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER NOT NULL);")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t (x) VALUES (NULL)", [])
            .unwrap_err();
        assert_eq!(from_rusqlite(err).kind(), ExErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_other_failure_is_persistence() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("DELETE FROM missing_table", []).unwrap_err();
        assert_eq!(from_rusqlite(err).kind(), ExErrorKind::Persistence);
    }
}
