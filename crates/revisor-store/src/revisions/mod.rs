//! Snapshot store over the shared revision table.
//!
//! ## Responsibilities
//!
//! - Own the revision schema and its primary key strategy
//! - Apply the body codec at the storage boundary
//! - Assign ids (integer mode) and creation timestamps
//! - Scoped batch deletes and projected, ordered queries
//!
//! ## Non-Responsibilities
//!
//! - Transactions: every operation runs on the `&Connection` it is given.
//!   Passing a `&rusqlite::Transaction` makes the operation part of that
//!   transaction.
//! - Deciding when revisions are captured or retired (handled by `revisor-engine`)

mod rows;
mod store;

pub use store::SnapshotStore;
