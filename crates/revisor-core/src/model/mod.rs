//! Revision domain model
//!
//! A revision is an immutable, timestamped snapshot of one tracked entity
//! instance, addressed polymorphically by `(instance_type, instance_id)`.

pub mod entity;
pub mod ids;
pub mod revision;

pub use entity::{entity_key, Entity};
pub use ids::{InstanceId, InstanceIdType, PrimaryKeyStrategy, RevisionId};
pub use revision::{NewRevision, ProjectedRevision, Revision};
