//! Revisor Engine - revision tracking on entity lifecycles
//!
//! Coordinates the core model and the snapshot store:
//! - A lifecycle hook registry and a transactional host entity model
//! - Capture and retention hooks
//! - The `Revisioner` that installs them per entity type
//! - The history reader

pub mod entity;
pub mod history;
pub mod hooks;
pub mod lifecycle;
pub mod revisioner;

pub use entity::EntityModel;
pub use history::HistoryReader;
pub use lifecycle::{FnHook, HookContext, LifecycleHook, LifecycleHooks};
pub use revisioner::{Revisioner, Tracking};
