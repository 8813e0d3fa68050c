//! Revisor Store - SQLite persistence for revisions
//!
//! Provides:
//! - Connection setup for the backing database
//! - Configuration-derived schema migrations with checksums
//! - The snapshot store: insert, scoped delete and projected queries over
//!   the shared, polymorphic revision table

pub mod db;
pub mod errors;
pub mod migrations;
pub mod revisions;

// Re-export key types
pub use errors::Result;
pub use revisions::SnapshotStore;
