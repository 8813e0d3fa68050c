//! Retention hook: delete an instance's revisions after it is destroyed

use crate::lifecycle::{HookContext, LifecycleHook};
use revisor_core::errors::Result;
use revisor_core::model::Entity;
use revisor_core::{log_op_end, log_op_error, log_op_start};
use revisor_store::SnapshotStore;
use std::sync::Arc;

pub const RETENTION_OP: &str = "revision_retention";

/// Removes every revision of a destroyed instance of the tracked type
///
/// Revisions of other instances, including instances of other types that
/// share the same id, are untouched.
#[derive(Debug, Clone)]
pub struct RetentionHook {
    store: Arc<SnapshotStore>,
    instance_type: String,
}

impl RetentionHook {
    pub fn new(store: Arc<SnapshotStore>, instance_type: impl Into<String>) -> Self {
        Self {
            store,
            instance_type: instance_type.into(),
        }
    }

    /// Delete the destroyed instance's revisions, returning how many went
    pub fn retire<E: Entity>(&self, ctx: &HookContext<'_, E>) -> Result<usize> {
        let instance_id = ctx.instance.instance_id();
        log_op_start!(
            RETENTION_OP,
            instance_type = %self.instance_type,
            instance_id = %instance_id
        );
        let start = std::time::Instant::now();

        let deleted = self
            .store
            .delete_where(ctx.tx, &self.instance_type, &instance_id)
            .map_err(|e| {
                log_op_error!(
                    RETENTION_OP,
                    e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    instance_type = %self.instance_type,
                    instance_id = %instance_id
                );
                e
            })?;

        log_op_end!(
            RETENTION_OP,
            duration_ms = start.elapsed().as_millis() as u64,
            instance_type = %self.instance_type,
            instance_id = %instance_id,
            deleted_count = deleted
        );

        Ok(deleted)
    }
}

impl<E: Entity> LifecycleHook<E> for RetentionHook {
    fn name(&self) -> &str {
        RETENTION_OP
    }

    fn run(&self, ctx: &HookContext<'_, E>) -> Result<()> {
        self.retire(ctx).map(|_| ())
    }
}
