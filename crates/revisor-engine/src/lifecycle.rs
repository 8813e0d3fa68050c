//! Lifecycle hook registry
//!
//! The host entity model calls registered hooks inline with its own writes:
//! `before_save` hooks run before the entity row is written, `after_destroy`
//! hooks run after the entity row is removed. Both run inside the host's
//! transaction and receive it through [`HookContext`]; a hook cannot open a
//! transaction of its own.
//!
//! The first failing hook stops the sequence. Its error is returned as
//! `TransactionAborted` with the hook's error as the source, and the host
//! transaction is rolled back.

use revisor_core::errors::{ExError, ExErrorKind, Result};
use revisor_core::model::{entity_key, Entity};
use rusqlite::Transaction;

/// What a hook sees of the operation it is observing
pub struct HookContext<'a, E> {
    /// The instance being saved or destroyed
    pub instance: &'a E,
    /// Type name of the host model
    pub type_name: &'a str,
    /// The host's open transaction
    pub tx: &'a Transaction<'a>,
}

impl<E: Entity> HookContext<'_, E> {
    /// `Type#id` of the observed instance
    pub fn entity_key(&self) -> String {
        entity_key(self.type_name, &self.instance.instance_id())
    }
}

/// A handler attached to a model lifecycle event
pub trait LifecycleHook<E>: Send + Sync {
    /// Name used in abort errors and logs
    fn name(&self) -> &str;

    /// Run the hook inside the host transaction
    ///
    /// # Errors
    ///
    /// Any error aborts the host operation.
    fn run(&self, ctx: &HookContext<'_, E>) -> Result<()>;
}

/// Adapts a closure into a named hook
pub struct FnHook<F> {
    name: String,
    handler: F,
}

impl<F> FnHook<F> {
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<E, F> LifecycleHook<E> for FnHook<F>
where
    F: Fn(&HookContext<'_, E>) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &HookContext<'_, E>) -> Result<()> {
        (self.handler)(ctx)
    }
}

/// Hooks registered for one entity type
pub struct LifecycleHooks<E> {
    before_save: Vec<Box<dyn LifecycleHook<E>>>,
    after_destroy: Vec<Box<dyn LifecycleHook<E>>>,
}

impl<E> Default for LifecycleHooks<E> {
    fn default() -> Self {
        Self {
            before_save: Vec::new(),
            after_destroy: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for LifecycleHooks<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("before_save", &self.before_save_names())
            .field("after_destroy", &self.after_destroy_names())
            .finish()
    }
}

impl<E> LifecycleHooks<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook to run before every save, after those already registered
    pub fn before_save(&mut self, hook: impl LifecycleHook<E> + 'static) -> &mut Self {
        self.before_save.push(Box::new(hook));
        self
    }

    /// Register a hook to run after every destroy
    pub fn after_destroy(&mut self, hook: impl LifecycleHook<E> + 'static) -> &mut Self {
        self.after_destroy.push(Box::new(hook));
        self
    }

    /// Register a closure as a before-save hook
    pub fn before_save_fn<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&HookContext<'_, E>) -> Result<()> + Send + Sync + 'static,
    {
        self.before_save(FnHook::new(name, handler))
    }

    /// Register a closure as an after-destroy hook
    pub fn after_destroy_fn<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&HookContext<'_, E>) -> Result<()> + Send + Sync + 'static,
    {
        self.after_destroy(FnHook::new(name, handler))
    }

    pub fn before_save_names(&self) -> Vec<&str> {
        self.before_save.iter().map(|h| h.name()).collect()
    }

    pub fn after_destroy_names(&self) -> Vec<&str> {
        self.after_destroy.iter().map(|h| h.name()).collect()
    }
}

impl<E: Entity> LifecycleHooks<E> {
    pub(crate) fn run_before_save(&self, ctx: &HookContext<'_, E>) -> Result<()> {
        run_all(&self.before_save, ctx, "entity_save")
    }

    pub(crate) fn run_after_destroy(&self, ctx: &HookContext<'_, E>) -> Result<()> {
        run_all(&self.after_destroy, ctx, "entity_destroy")
    }
}

fn run_all<E: Entity>(
    hooks: &[Box<dyn LifecycleHook<E>>],
    ctx: &HookContext<'_, E>,
    op: &str,
) -> Result<()> {
    for hook in hooks {
        hook.run(ctx).map_err(|e| {
            ExError::new(ExErrorKind::TransactionAborted)
                .with_op(op)
                .with_entity_id(ctx.entity_key())
                .with_message(format!("{} hook failed", hook.name()))
                .with_source(e)
        })?;
    }
    Ok(())
}
