//! Transactional host entity model
//!
//! A minimal persistence layer for tracked entities: one generic `entities`
//! table keyed by `(entity_type, entity_id)` holding each instance's plain
//! values as JSON text. Saves and destroys run the registered lifecycle
//! hooks inline, inside the same transaction as the entity write.

use crate::lifecycle::{HookContext, LifecycleHooks};
use revisor_core::errors::{ExError, ExErrorKind, Result};
use revisor_core::model::entity::validate_type_tag;
use revisor_core::model::{entity_key, Entity, InstanceId};
use revisor_store::errors::from_rusqlite;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;

const ENTITIES_DDL: &str = "CREATE TABLE IF NOT EXISTS entities (
    entity_type TEXT NOT NULL,
    entity_id NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (entity_type, entity_id)
)";

/// Persistence and lifecycle of one entity type
#[derive(Debug)]
pub struct EntityModel<E> {
    type_name: String,
    hooks: LifecycleHooks<E>,
}

impl<E: Entity> EntityModel<E> {
    /// Create a model with no hooks registered
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty type name
    pub fn new(type_name: impl Into<String>) -> Result<Self> {
        let type_name = type_name.into();
        validate_type_tag(&type_name)?;
        Ok(Self {
            type_name,
            hooks: LifecycleHooks::new(),
        })
    }

    /// Create the entities table if it is missing
    pub fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute(ENTITIES_DDL, [])
            .map_err(|e| from_rusqlite(e).with_op("entity_schema"))?;
        Ok(())
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn hooks(&self) -> &LifecycleHooks<E> {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut LifecycleHooks<E> {
        &mut self.hooks
    }

    /// Save an instance in its own IMMEDIATE transaction
    ///
    /// # Errors
    ///
    /// - `TransactionAborted` if a before-save hook fails; nothing is written
    /// - `Serialization` if the instance has no object representation
    /// - `Persistence` for database failures
    pub fn save(&self, conn: &mut Connection, instance: &E) -> Result<()> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| from_rusqlite(e).with_op("entity_save"))?;
        self.save_in(&tx, instance)?;
        tx.commit()
            .map_err(|e| from_rusqlite(e).with_op("entity_save"))?;
        Ok(())
    }

    /// Save an instance inside a caller's transaction
    ///
    /// On error the caller must not commit; dropping the transaction rolls
    /// back every write the hooks made.
    pub fn save_in(&self, tx: &Transaction<'_>, instance: &E) -> Result<()> {
        let ctx = HookContext {
            instance,
            type_name: &self.type_name,
            tx,
        };
        self.hooks.run_before_save(&ctx)?;

        let instance_id = instance.instance_id();
        let body = instance.plain_values()?;
        tx.execute(
            "INSERT INTO entities (entity_type, entity_id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT (entity_type, entity_id) DO UPDATE SET body = excluded.body",
            rusqlite::params![self.type_name, id_param(&instance_id), body.to_string()],
        )
        .map_err(|e| {
            from_rusqlite(e)
                .with_op("entity_save")
                .with_entity_id(entity_key(&self.type_name, &instance_id))
        })?;

        tracing::debug!(entity = %entity_key(&self.type_name, &instance_id), "Saved entity");
        Ok(())
    }

    /// Destroy an instance in its own IMMEDIATE transaction
    ///
    /// # Errors
    ///
    /// - `NotFound` if the instance is not persisted
    /// - `TransactionAborted` if an after-destroy hook fails; the entity row
    ///   is restored by the rollback
    /// - `Persistence` for database failures
    pub fn destroy(&self, conn: &mut Connection, instance: &E) -> Result<()> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| from_rusqlite(e).with_op("entity_destroy"))?;
        self.destroy_in(&tx, instance)?;
        tx.commit()
            .map_err(|e| from_rusqlite(e).with_op("entity_destroy"))?;
        Ok(())
    }

    /// Destroy an instance inside a caller's transaction
    pub fn destroy_in(&self, tx: &Transaction<'_>, instance: &E) -> Result<()> {
        let instance_id = instance.instance_id();
        let removed = tx
            .execute(
                "DELETE FROM entities WHERE entity_type = ?1 AND entity_id = ?2",
                rusqlite::params![self.type_name, id_param(&instance_id)],
            )
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("entity_destroy")
                    .with_entity_id(entity_key(&self.type_name, &instance_id))
            })?;
        if removed == 0 {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("entity_destroy")
                .with_entity_id(entity_key(&self.type_name, &instance_id))
                .with_message("entity is not persisted"));
        }

        let ctx = HookContext {
            instance,
            type_name: &self.type_name,
            tx,
        };
        self.hooks.run_after_destroy(&ctx)?;

        tracing::debug!(entity = %entity_key(&self.type_name, &instance_id), "Destroyed entity");
        Ok(())
    }
}

impl<E: Entity + DeserializeOwned> EntityModel<E> {
    /// Current persisted state of an instance
    pub fn find(&self, conn: &Connection, instance_id: &InstanceId) -> Result<Option<E>> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM entities WHERE entity_type = ?1 AND entity_id = ?2",
                rusqlite::params![self.type_name, id_param(instance_id)],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| from_rusqlite(e).with_op("entity_find"))?;

        body.map(|text| {
            serde_json::from_str(&text).map_err(|e| {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("entity_find")
                    .with_entity_id(entity_key(&self.type_name, instance_id))
                    .with_message(e.to_string())
            })
        })
        .transpose()
    }
}

fn id_param(instance_id: &InstanceId) -> rusqlite::types::Value {
    match instance_id {
        InstanceId::Integer(v) => rusqlite::types::Value::Integer(*v),
        InstanceId::Token(v) => rusqlite::types::Value::Text(v.clone()),
    }
}
