use super::rows::{
    instance_id_value, millis_to_datetime, read_revision_id, revision_id_value, RawRow,
    SelectPlan, SqlBody,
};
use crate::errors::{from_rusqlite, Result};
use revisor_core::codec::{codec_for, BodyCodec};
use revisor_core::config::RevisionerConfig;
use revisor_core::errors::{ExError, RevisionError};
use revisor_core::model::entity::{entity_key, validate_type_tag};
use revisor_core::model::{
    InstanceId, NewRevision, PrimaryKeyStrategy, ProjectedRevision, Revision, RevisionId,
};
use revisor_core::query::{HistoryFilter, Projection, RevisionQuery};
use rusqlite::{params_from_iter, Connection};

/// Persistence of revisions in the shared revision table
///
/// Holds the configuration and the body codec chosen for it. The store is
/// `Send + Sync` and is shared by every hook the revisioner installs.
#[derive(Debug)]
pub struct SnapshotStore {
    config: RevisionerConfig,
    codec: Box<dyn BodyCodec>,
}

impl SnapshotStore {
    /// Build a store for a validated configuration
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the table name is not a plain SQL identifier
    pub fn new(config: RevisionerConfig) -> Result<Self> {
        config.validate()?;
        let codec = codec_for(config.body_storage);
        Ok(Self { config, codec })
    }

    pub fn config(&self) -> &RevisionerConfig {
        &self.config
    }

    pub fn table(&self) -> &str {
        &self.config.table_name
    }

    /// Insert one revision
    ///
    /// In integer mode an absent id is assigned by the table. `created_at`,
    /// when absent, is the later of now and the newest timestamp already in
    /// the table.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty instance type
    /// - `ConstraintViolation` for an id or instance id of the wrong type,
    ///   a missing token in token mode, or a duplicate id
    /// - `Serialization` if the body cannot be encoded
    /// - `Persistence` for any other database failure
    pub fn insert(&self, conn: &Connection, revision: NewRevision) -> Result<Revision> {
        validate_type_tag(&revision.instance_type)?;
        self.check_instance_id(&revision.instance_id)?;
        match (&revision.id, self.config.primary_key) {
            (Some(id), strategy) if id.strategy() != strategy => {
                return Err(ExError::from(RevisionError::RevisionIdTypeMismatch {
                    revision_id: id.to_string(),
                    expected: strategy.as_str().to_string(),
                })
                .with_op("revision_insert"));
            }
            (None, PrimaryKeyStrategy::Token) => {
                return Err(ExError::from(RevisionError::MissingRevisionToken)
                    .with_op("revision_insert")
                    .with_entity_id(entity_key(
                        &revision.instance_type,
                        &revision.instance_id,
                    )));
            }
            _ => {}
        }

        let stored = self.codec.encode(&revision.body)?;
        let now = chrono::Utc::now().timestamp_millis();
        let explicit_created_at = revision.created_at.map(|t| t.timestamp_millis());

        let sql = format!(
            "INSERT INTO {t} (id, instance_type, instance_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4,
                     COALESCE(?5, MAX(?6, COALESCE((SELECT MAX(created_at) FROM {t}), ?6))))
             RETURNING id, created_at",
            t = self.config.table_name
        );

        let strategy = self.config.primary_key;
        let (id, created_at): (RevisionId, i64) = conn
            .query_row(
                &sql,
                rusqlite::params![
                    revision_id_value(revision.id.as_ref()),
                    revision.instance_type,
                    instance_id_value(&revision.instance_id),
                    SqlBody(&stored),
                    explicit_created_at,
                    now,
                ],
                |row| Ok((read_revision_id(row, 0, strategy)?, row.get(1)?)),
            )
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("revision_insert")
                    .with_entity_id(entity_key(&revision.instance_type, &revision.instance_id))
            })?;

        tracing::debug!(
            table = %self.config.table_name,
            revision_id = %id,
            instance_type = %revision.instance_type,
            instance_id = %revision.instance_id,
            "Inserted revision"
        );

        Ok(Revision {
            id,
            instance_type: revision.instance_type,
            instance_id: revision.instance_id,
            body: revision.body,
            created_at: millis_to_datetime(created_at)?,
        })
    }

    /// Delete every revision of one instance, returning how many were removed
    ///
    /// Deleting an instance with no revisions succeeds with 0.
    pub fn delete_where(
        &self,
        conn: &Connection,
        instance_type: &str,
        instance_id: &InstanceId,
    ) -> Result<usize> {
        validate_type_tag(instance_type)?;
        self.check_instance_id(instance_id)?;

        let sql = format!(
            "DELETE FROM {} WHERE instance_type = ?1 AND instance_id = ?2",
            self.config.table_name
        );
        let deleted = conn
            .execute(
                &sql,
                rusqlite::params![instance_type, instance_id_value(instance_id)],
            )
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("revision_delete")
                    .with_entity_id(entity_key(instance_type, instance_id))
            })?;

        tracing::debug!(
            table = %self.config.table_name,
            instance_type = %instance_type,
            instance_id = %instance_id,
            deleted_count = deleted,
            "Deleted revisions"
        );

        Ok(deleted)
    }

    /// Run a projected, filtered and ordered query
    ///
    /// An unscoped query reads across every tracked type; the history reader
    /// always scopes its queries.
    pub fn query(&self, conn: &Connection, query: &RevisionQuery) -> Result<Vec<ProjectedRevision>> {
        if let Some((instance_type, instance_id)) = &query.scope {
            validate_type_tag(instance_type)?;
            self.check_instance_id(instance_id)?;
        }
        if let Some(ids) = &query.filter.ids {
            for id in ids {
                self.check_revision_id(id)?;
            }
        }

        let plan = SelectPlan::build(&self.config, query);
        let mut stmt = conn
            .prepare(&plan.sql)
            .map_err(|e| from_rusqlite(e).with_op("revision_query"))?;

        let raw: Vec<RawRow> = stmt
            .query_map(params_from_iter(plan.params.iter()), |row| {
                plan.read_row(row, &self.config)
            })
            .map_err(|e| from_rusqlite(e).with_op("revision_query"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| from_rusqlite(e).with_op("revision_query"))?;

        tracing::debug!(
            table = %self.config.table_name,
            row_count = raw.len(),
            "Queried revisions"
        );

        raw.into_iter().map(|row| self.decode_row(row)).collect()
    }

    /// Fetch one full revision of one instance
    ///
    /// A revision id that exists but belongs to another instance is `None`.
    pub fn find(
        &self,
        conn: &Connection,
        instance_type: &str,
        instance_id: &InstanceId,
        revision_id: &RevisionId,
    ) -> Result<Option<Revision>> {
        let query = RevisionQuery {
            scope: Some((instance_type.to_string(), instance_id.clone())),
            filter: HistoryFilter {
                ids: Some(vec![revision_id.clone()]),
                ..HistoryFilter::default()
            },
            projection: Projection::full(),
            limit: Some(1),
            ..RevisionQuery::default()
        };
        Ok(self
            .query(conn, &query)?
            .into_iter()
            .next()
            .and_then(ProjectedRevision::into_revision))
    }

    /// Number of revisions recorded for one instance
    pub fn count(
        &self,
        conn: &Connection,
        instance_type: &str,
        instance_id: &InstanceId,
    ) -> Result<usize> {
        validate_type_tag(instance_type)?;
        self.check_instance_id(instance_id)?;

        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE instance_type = ?1 AND instance_id = ?2",
            self.config.table_name
        );
        let count: i64 = conn
            .query_row(
                &sql,
                rusqlite::params![instance_type, instance_id_value(instance_id)],
                |row| row.get(0),
            )
            .map_err(|e| from_rusqlite(e).with_op("revision_count"))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn decode_row(&self, row: RawRow) -> Result<ProjectedRevision> {
        let body = row.body.map(|b| self.codec.decode(b)).transpose()?;
        Ok(ProjectedRevision {
            id: row.id,
            created_at: millis_to_datetime(row.created_at)?,
            instance_type: row.instance_type,
            instance_id: row.instance_id,
            body,
        })
    }

    fn check_instance_id(&self, instance_id: &InstanceId) -> Result<()> {
        let expected = self.config.instance_id_type;
        if instance_id.id_type() != expected {
            return Err(ExError::from(RevisionError::InstanceIdTypeMismatch {
                instance_id: instance_id.to_string(),
                expected: expected.as_str().to_string(),
            }));
        }
        Ok(())
    }

    fn check_revision_id(&self, revision_id: &RevisionId) -> Result<()> {
        let expected = self.config.primary_key;
        if revision_id.strategy() != expected {
            return Err(ExError::from(RevisionError::RevisionIdTypeMismatch {
                revision_id: revision_id.to_string(),
                expected: expected.as_str().to_string(),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::migrations::apply_migrations;
    use revisor_core::errors::ExErrorKind;
    use serde_json::json;

    fn setup(config: RevisionerConfig) -> (Connection, SnapshotStore) {
        let mut conn = open_in_memory().unwrap();
        apply_migrations(&mut conn, &config).unwrap();
        (conn, SnapshotStore::new(config).unwrap())
    }

    #[test]
    fn test_insert_assigns_integer_id() {
        let (conn, store) = setup(RevisionerConfig::default());
        let first = store
            .insert(&conn, NewRevision::new("Post", 1.into(), json!({"title": "a"})))
            .unwrap();
        let second = store
            .insert(&conn, NewRevision::new("Post", 1.into(), json!({"title": "b"})))
            .unwrap();
        assert!(matches!(first.id, RevisionId::Integer(_)));
        assert_ne!(first.id, second.id);
        assert!(second.created_at >= first.created_at);
    }

    #[test]
    fn test_token_mode_requires_id() {
        let (conn, store) =
            setup(RevisionerConfig::default().with_primary_key(PrimaryKeyStrategy::Token));
        let err = store
            .insert(&conn, NewRevision::new("Post", 1.into(), json!({})))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
        assert_eq!(err.entity_id(), Some("Post#1"));
    }

    #[test]
    fn test_instance_id_type_mismatch() {
        let (conn, store) = setup(RevisionerConfig::default());
        let err = store
            .insert(&conn, NewRevision::new("Post", "abc".into(), json!({})))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_empty_type_rejected() {
        let (conn, store) = setup(RevisionerConfig::default());
        let err = store
            .insert(&conn, NewRevision::new("", 1.into(), json!({})))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_count_and_delete() {
        let (conn, store) = setup(RevisionerConfig::default());
        for n in 0..3 {
            store
                .insert(&conn, NewRevision::new("Post", 1.into(), json!({ "n": n })))
                .unwrap();
        }
        assert_eq!(store.count(&conn, "Post", &1.into()).unwrap(), 3);
        assert_eq!(store.delete_where(&conn, "Post", &1.into()).unwrap(), 3);
        assert_eq!(store.count(&conn, "Post", &1.into()).unwrap(), 0);
        assert_eq!(store.delete_where(&conn, "Post", &1.into()).unwrap(), 0);
    }

    #[test]
    fn test_find_scoped_to_instance() {
        let (conn, store) = setup(RevisionerConfig::default());
        let rev = store
            .insert(&conn, NewRevision::new("Post", 1.into(), json!({"title": "a"})))
            .unwrap();

        let found = store.find(&conn, "Post", &1.into(), &rev.id).unwrap();
        assert_eq!(found, Some(rev.clone()));
        assert_eq!(store.find(&conn, "Post", &2.into(), &rev.id).unwrap(), None);
        assert_eq!(store.find(&conn, "Comment", &1.into(), &rev.id).unwrap(), None);
    }
}
