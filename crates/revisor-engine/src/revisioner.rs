//! Revisioner: installs revision tracking on entity types
//!
//! One revisioner owns one revision table. Every type it tracks shares that
//! table, its primary key strategy and its body storage.

use crate::history::HistoryReader;
use crate::hooks::{CaptureHook, RetentionHook};
use crate::lifecycle::LifecycleHooks;
use revisor_core::config::{RevisionerConfig, TrackOptions};
use revisor_core::errors::Result;
use revisor_core::model::entity::validate_type_tag;
use revisor_core::model::Entity;
use revisor_store::migrations::apply_migrations;
use revisor_store::SnapshotStore;
use rusqlite::Connection;
use std::sync::Arc;

/// Which hooks `enable` installed for a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tracking {
    pub capture: bool,
    pub retention: bool,
}

#[derive(Debug, Clone)]
pub struct Revisioner {
    store: Arc<SnapshotStore>,
}

impl Revisioner {
    /// Build the shared snapshot store for a configuration
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the configuration is invalid
    pub fn new(config: RevisionerConfig) -> Result<Self> {
        Ok(Self {
            store: Arc::new(SnapshotStore::new(config)?),
        })
    }

    pub fn config(&self) -> &RevisionerConfig {
        self.store.config()
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Create the revision table for this configuration
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if the table exists with a different configuration
    /// - `Persistence` for database failures
    pub fn migrate(&self, conn: &mut Connection) -> Result<()> {
        apply_migrations(conn, self.store.config())
    }

    /// Track saves (and, unless disabled, destroys) of one entity type
    ///
    /// The capture hook is appended to the type's before-save hooks. The
    /// retention hook is appended to its after-destroy hooks unless
    /// `options.retention` is `Some(false)`, or is `None` and the
    /// configuration default is off.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty type tag
    pub fn enable<E: Entity + 'static>(
        &self,
        hooks: &mut LifecycleHooks<E>,
        type_tag: &str,
        options: TrackOptions,
    ) -> Result<Tracking> {
        validate_type_tag(type_tag)?;

        hooks.before_save(CaptureHook::new(self.store.clone(), type_tag));

        let retention = options.installs_retention(self.store.config());
        if retention {
            hooks.after_destroy(RetentionHook::new(self.store.clone(), type_tag));
        }

        tracing::debug!(
            instance_type = type_tag,
            retention = retention,
            "Enabled revision tracking"
        );

        Ok(Tracking {
            capture: true,
            retention,
        })
    }

    /// History reader over this revisioner's table
    pub fn history(&self) -> HistoryReader {
        HistoryReader::new(self.store.clone())
    }
}
