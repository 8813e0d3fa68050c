//! Capture hook: snapshot an instance into a new revision before it is saved

use crate::lifecycle::{HookContext, LifecycleHook};
use revisor_core::errors::Result;
use revisor_core::model::{Entity, NewRevision, PrimaryKeyStrategy, Revision, RevisionId};
use revisor_core::{log_op_end, log_op_error, log_op_start};
use revisor_store::SnapshotStore;
use std::sync::Arc;

pub const CAPTURE_OP: &str = "revision_capture";

/// Inserts one revision per save of the tracked type
///
/// Under the token primary key strategy the hook generates a fresh random
/// token (UUID v4) for every revision; under the integer strategy the store
/// assigns the id.
#[derive(Debug, Clone)]
pub struct CaptureHook {
    store: Arc<SnapshotStore>,
    instance_type: String,
}

impl CaptureHook {
    pub fn new(store: Arc<SnapshotStore>, instance_type: impl Into<String>) -> Self {
        Self {
            store,
            instance_type: instance_type.into(),
        }
    }

    /// Build and insert the revision for one instance
    ///
    /// # Errors
    ///
    /// - `Serialization` if the instance's plain values cannot be captured
    /// - `ConstraintViolation` if the store rejects the revision
    /// - `Persistence` for database failures
    pub fn capture<E: Entity>(&self, ctx: &HookContext<'_, E>) -> Result<Revision> {
        let instance_id = ctx.instance.instance_id();
        log_op_start!(
            CAPTURE_OP,
            instance_type = %self.instance_type,
            instance_id = %instance_id
        );
        let start = std::time::Instant::now();

        let result = self.capture_impl(ctx).map_err(|e| {
            log_op_error!(
                CAPTURE_OP,
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                instance_type = %self.instance_type,
                instance_id = %instance_id
            );
            e
        })?;

        log_op_end!(
            CAPTURE_OP,
            duration_ms = start.elapsed().as_millis() as u64,
            instance_type = %self.instance_type,
            instance_id = %instance_id,
            revision_id = %result.id
        );

        Ok(result)
    }

    fn capture_impl<E: Entity>(&self, ctx: &HookContext<'_, E>) -> Result<Revision> {
        let body = ctx.instance.plain_values()?;
        let mut revision = NewRevision::new(
            self.instance_type.clone(),
            ctx.instance.instance_id(),
            body,
        );
        if self.store.config().primary_key == PrimaryKeyStrategy::Token {
            revision = revision.with_id(RevisionId::Token(uuid::Uuid::new_v4().to_string()));
        }
        self.store.insert(ctx.tx, revision)
    }
}

impl<E: Entity> LifecycleHook<E> for CaptureHook {
    fn name(&self) -> &str {
        CAPTURE_OP
    }

    fn run(&self, ctx: &HookContext<'_, E>) -> Result<()> {
        self.capture(ctx).map(|_| ())
    }
}
