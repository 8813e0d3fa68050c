//! History reader: read-only access to one instance's revisions
//!
//! Every query is scoped by the `(instance_type, instance_id)` passed in. The
//! options a caller supplies can filter, order, page and project, but cannot
//! widen the scope.

use revisor_core::errors::Result;
use revisor_core::model::{InstanceId, ProjectedRevision, Revision, RevisionId};
use revisor_core::query::{ListOptions, Projection, RevisionQuery, SortOrder};
use revisor_core::{log_op_end, log_op_error, log_op_start};
use revisor_store::SnapshotStore;
use rusqlite::Connection;
use std::sync::Arc;

/// Reads revision history through a shared store
#[derive(Debug, Clone)]
pub struct HistoryReader {
    store: Arc<SnapshotStore>,
}

impl HistoryReader {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }

    /// List one instance's revisions
    ///
    /// Defaults: oldest first, `id` and `created_at` only.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty instance type
    /// - `ConstraintViolation` for an id of the wrong type
    /// - `Serialization` if a selected body cannot be decoded
    /// - `Persistence` for database failures
    pub fn list_revisions(
        &self,
        conn: &Connection,
        instance_type: &str,
        instance_id: &InstanceId,
        options: &ListOptions,
    ) -> Result<Vec<ProjectedRevision>> {
        log_op_start!(
            "history_list",
            instance_type = instance_type,
            instance_id = %instance_id
        );
        let start = std::time::Instant::now();

        let query = RevisionQuery::scoped(instance_type, instance_id, options);
        let rows = self.store.query(conn, &query).map_err(|e| {
            log_op_error!(
                "history_list",
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                instance_type = instance_type
            );
            e
        })?;

        log_op_end!(
            "history_list",
            duration_ms = start.elapsed().as_millis() as u64,
            instance_type = instance_type,
            row_count = rows.len()
        );

        Ok(rows)
    }

    /// Fetch one full revision of one instance
    ///
    /// A revision id that does not exist, or that belongs to another
    /// instance, yields `Ok(None)`.
    pub fn get_revision(
        &self,
        conn: &Connection,
        instance_type: &str,
        instance_id: &InstanceId,
        revision_id: &RevisionId,
    ) -> Result<Option<Revision>> {
        log_op_start!(
            "history_get",
            instance_type = instance_type,
            instance_id = %instance_id,
            revision_id = %revision_id
        );
        let start = std::time::Instant::now();

        let found = self
            .store
            .find(conn, instance_type, instance_id, revision_id)
            .map_err(|e| {
                log_op_error!(
                    "history_get",
                    e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    instance_type = instance_type
                );
                e
            })?;

        log_op_end!(
            "history_get",
            duration_ms = start.elapsed().as_millis() as u64,
            instance_type = instance_type,
            row_count = usize::from(found.is_some())
        );

        Ok(found)
    }

    /// Newest full revision of one instance, if any
    pub fn latest_revision(
        &self,
        conn: &Connection,
        instance_type: &str,
        instance_id: &InstanceId,
    ) -> Result<Option<Revision>> {
        let options = ListOptions {
            order: SortOrder::Descending,
            projection: Projection::full(),
            limit: Some(1),
            ..ListOptions::default()
        };
        Ok(self
            .list_revisions(conn, instance_type, instance_id, &options)?
            .into_iter()
            .next()
            .and_then(ProjectedRevision::into_revision))
    }
}
