//! Revisor Core - revision model, snapshot codec and shared facilities
//!
//! This crate provides the storage-agnostic half of revision tracking:
//! - Revision, id and tracked-entity types
//! - The snapshot body codec (native or serialized storage)
//! - Configuration of the revision table and hooks
//! - Query options for history reads
//! - The error facility and the structured logging facility

pub mod codec;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod query;

// Re-exported for the logging macros
pub use revisor_core_types;

pub use codec::{codec_for, BodyCodec, BodyStorage, StoredBody};
pub use config::{RevisionerConfig, TrackOptions};
pub use errors::{ExError, ExErrorKind, Result, RevisionError};
pub use model::{
    Entity, InstanceId, InstanceIdType, NewRevision, PrimaryKeyStrategy, ProjectedRevision,
    Revision, RevisionId,
};
pub use query::{HistoryFilter, ListOptions, Projection, RevisionField, RevisionQuery, SortOrder};
