//! Migration framework
//!
//! Provides:
//! - Revision table DDL derived from the configuration
//! - Migration runner with checksums and idempotent application

mod checksums;
mod runner;
mod schema;

pub use runner::apply_migrations;
pub use schema::{revision_table_migration, Migration};
