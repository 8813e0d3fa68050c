//! Revision hooks installed by the revisioner
//!
//! ## Logging Ownership
//!
//! Each hook owns lifecycle logging for its operation:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! The store below only uses `tracing::debug!()` for internal details.

pub mod capture;
pub mod retention;

pub use capture::CaptureHook;
pub use retention::RetentionHook;
